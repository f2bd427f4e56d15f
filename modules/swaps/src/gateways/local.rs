use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::SwapsApi,
    error::SwapsError,
    model::{
        Caller, ConversationSummary, Message, MessageView, NewSwapRequest, SwapOverview,
        SwapRequest, SwapStatus,
    },
};
use crate::domain::service::Service;

/// Local implementation of the SwapsApi trait that delegates to the domain service
pub struct SwapsLocalClient {
    service: Arc<Service>,
}

impl SwapsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SwapsApi for SwapsLocalClient {
    async fn create_swap(
        &self,
        caller: Caller,
        new_request: NewSwapRequest,
    ) -> Result<SwapRequest, SwapsError> {
        self.service
            .create_swap(caller, new_request)
            .await
            .map_err(Into::into)
    }

    async fn list_outgoing(&self, caller: Caller) -> Result<Vec<SwapOverview>, SwapsError> {
        self.service.list_outgoing(caller).await.map_err(Into::into)
    }

    async fn list_incoming(&self, caller: Caller) -> Result<Vec<SwapOverview>, SwapsError> {
        self.service.list_incoming(caller).await.map_err(Into::into)
    }

    async fn set_status(
        &self,
        caller: Caller,
        swap_id: Uuid,
        next: SwapStatus,
    ) -> Result<SwapRequest, SwapsError> {
        self.service
            .set_status(caller, swap_id, next)
            .await
            .map_err(Into::into)
    }

    async fn list_swap_messages(
        &self,
        caller: Caller,
        swap_id: Uuid,
    ) -> Result<Vec<MessageView>, SwapsError> {
        self.service
            .list_swap_messages(caller, swap_id)
            .await
            .map_err(Into::into)
    }

    async fn send_swap_message(
        &self,
        caller: Caller,
        swap_id: Uuid,
        body: String,
    ) -> Result<Message, SwapsError> {
        self.service
            .send_swap_message(caller, swap_id, body)
            .await
            .map_err(Into::into)
    }

    async fn list_partner_messages(
        &self,
        caller: Caller,
        partner_id: Uuid,
    ) -> Result<Vec<MessageView>, SwapsError> {
        self.service
            .list_partner_messages(caller, partner_id)
            .await
            .map_err(Into::into)
    }

    async fn send_partner_message(
        &self,
        caller: Caller,
        partner_id: Uuid,
        body: String,
    ) -> Result<Message, SwapsError> {
        self.service
            .send_partner_message(caller, partner_id, body)
            .await
            .map_err(Into::into)
    }

    async fn list_conversations(
        &self,
        caller: Caller,
    ) -> Result<Vec<ConversationSummary>, SwapsError> {
        self.service
            .list_conversations(caller)
            .await
            .map_err(Into::into)
    }

    async fn list_all_swaps(&self, caller: Caller) -> Result<Vec<SwapOverview>, SwapsError> {
        self.service
            .list_all_swaps(caller)
            .await
            .map_err(Into::into)
    }
}
