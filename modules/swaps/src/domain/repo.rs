use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{ConversationKey, Message, SwapRequest, SwapStatus};

/// Outcome of a compare-and-swap on `(id, expected_status)`.
#[derive(Debug, Clone)]
pub enum StatusCas {
    /// The swap succeeded; carries the updated record.
    Updated(SwapRequest),
    /// The record's status no longer matched the expectation.
    Raced { current: SwapStatus },
    /// No record with that id.
    Missing,
}

/// Port for the ledger: swap request persistence the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait SwapLedger: Send + Sync {
    /// Load a swap request by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<SwapRequest>>;
    /// True when the pair already has a `pending` or `accepted` request.
    async fn active_exists(&self, item_id: Uuid, requester_id: Uuid) -> anyhow::Result<bool>;
    /// Insert a fully-formed record.
    ///
    /// Service computes id/status/timestamps/validation; the ledger persists.
    async fn insert(&self, request: SwapRequest) -> anyhow::Result<()>;
    /// Atomically replace the status if it still equals `expected`,
    /// stamping `updated_at` with `at` on success. Transitions on one
    /// record serialize through this call; a lost race reports `Raced`
    /// instead of overwriting.
    async fn set_status_if(
        &self,
        id: Uuid,
        expected: SwapStatus,
        next: SwapStatus,
        at: DateTime<Utc>,
    ) -> anyhow::Result<StatusCas>;
    /// Requests created by `user_id`, newest first.
    async fn list_by_requester(&self, user_id: Uuid) -> anyhow::Result<Vec<SwapRequest>>;
    /// Requests against items owned by `user_id`, newest first.
    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<SwapRequest>>;
    /// Every record, newest first, capped at `limit`.
    async fn list_all(&self, limit: usize) -> anyhow::Result<Vec<SwapRequest>>;
}

/// A message to append. The store assigns the sequence number and
/// `created_at`; the service assigns everything else.
#[derive(Debug, Clone)]
pub struct NewStoredMessage {
    pub id: Uuid,
    pub swap_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub item_title: Option<String>,
    pub body: String,
}

/// Port for the conversation store: one append-only message log addressed
/// by swap id or by (unordered) participant pair.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append a message. The store is the single ordering authority per
    /// conversation: accepted-append order, sequence order and `created_at`
    /// order all agree.
    async fn append(&self, message: NewStoredMessage) -> anyhow::Result<Message>;
    /// Messages under `key`, chronological, oldest first.
    async fn list(&self, key: ConversationKey) -> anyhow::Result<Vec<Message>>;
    /// The latest message of each conversation `user_id` participates in,
    /// most recent conversation first.
    async fn conversation_heads(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>>;
}
