use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::SwapsError,
    model::{
        Caller, ConversationSummary, Message, MessageView, NewSwapRequest, SwapOverview,
        SwapRequest, SwapStatus,
    },
};

/// Public API trait for the swaps module that other modules can use
#[async_trait]
pub trait SwapsApi: Send + Sync {
    /// Create a swap request against an item. Status starts at `pending`.
    async fn create_swap(
        &self,
        caller: Caller,
        new_request: NewSwapRequest,
    ) -> Result<SwapRequest, SwapsError>;

    /// The caller's outgoing requests, newest first, with display fields.
    async fn list_outgoing(&self, caller: Caller) -> Result<Vec<SwapOverview>, SwapsError>;

    /// Requests against the caller's items, newest first, with display fields.
    async fn list_incoming(&self, caller: Caller) -> Result<Vec<SwapOverview>, SwapsError>;

    /// Apply a lifecycle transition to a swap request.
    async fn set_status(
        &self,
        caller: Caller,
        swap_id: Uuid,
        next: SwapStatus,
    ) -> Result<SwapRequest, SwapsError>;

    /// Chronological messages of one swap's conversation.
    async fn list_swap_messages(
        &self,
        caller: Caller,
        swap_id: Uuid,
    ) -> Result<Vec<MessageView>, SwapsError>;

    /// Append a message to a swap's conversation.
    async fn send_swap_message(
        &self,
        caller: Caller,
        swap_id: Uuid,
        body: String,
    ) -> Result<Message, SwapsError>;

    /// Chronological messages between the caller and a partner, across all swaps.
    async fn list_partner_messages(
        &self,
        caller: Caller,
        partner_id: Uuid,
    ) -> Result<Vec<MessageView>, SwapsError>;

    /// Append a message addressed to a partner, outside any swap context.
    async fn send_partner_message(
        &self,
        caller: Caller,
        partner_id: Uuid,
        body: String,
    ) -> Result<Message, SwapsError>;

    /// The caller's conversation inbox, most recent first.
    async fn list_conversations(
        &self,
        caller: Caller,
    ) -> Result<Vec<ConversationSummary>, SwapsError>;

    /// Every swap request in the ledger, newest first. Admin only.
    async fn list_all_swaps(&self, caller: Caller) -> Result<Vec<SwapOverview>, SwapsError>;
}
