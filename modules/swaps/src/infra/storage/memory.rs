//! In-memory adapters for the ledger and conversation store ports.
//!
//! The ledger keeps records in a `DashMap`; `set_status_if` runs under the
//! shard write lock so read-compare-write is one indivisible step. The
//! conversation log is a single `RwLock`-guarded vector whose lock is the
//! ordering authority: sequence numbers, accepted-append order and
//! `created_at` order agree by construction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::contract::model::{ConversationKey, Message, SwapRequest, SwapStatus};
use crate::domain::repo::{
    ConversationStore, NewStoredMessage, StatusCas, SwapLedger,
};

#[derive(Default)]
pub struct InMemorySwapLedger {
    records: DashMap<Uuid, SwapRequest>,
}

impl InMemorySwapLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut rows: Vec<SwapRequest>) -> Vec<SwapRequest> {
    rows.sort_unstable_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    rows
}

#[async_trait]
impl SwapLedger for InMemorySwapLedger {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<SwapRequest>> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }

    async fn active_exists(&self, item_id: Uuid, requester_id: Uuid) -> anyhow::Result<bool> {
        Ok(self.records.iter().any(|r| {
            r.item_id == item_id && r.requester_id == requester_id && r.status.is_active()
        }))
    }

    async fn insert(&self, request: SwapRequest) -> anyhow::Result<()> {
        self.records.insert(request.id, request);
        Ok(())
    }

    async fn set_status_if(
        &self,
        id: Uuid,
        expected: SwapStatus,
        next: SwapStatus,
        at: DateTime<Utc>,
    ) -> anyhow::Result<StatusCas> {
        // get_mut holds the shard write lock for the whole compare-and-swap.
        let Some(mut entry) = self.records.get_mut(&id) else {
            return Ok(StatusCas::Missing);
        };
        if entry.status != expected {
            return Ok(StatusCas::Raced {
                current: entry.status,
            });
        }
        entry.status = next;
        entry.updated_at = at;
        Ok(StatusCas::Updated(entry.clone()))
    }

    async fn list_by_requester(&self, user_id: Uuid) -> anyhow::Result<Vec<SwapRequest>> {
        let rows = self
            .records
            .iter()
            .filter(|r| r.requester_id == user_id)
            .map(|r| r.clone())
            .collect();
        Ok(newest_first(rows))
    }

    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<SwapRequest>> {
        let rows = self
            .records
            .iter()
            .filter(|r| r.owner_id == user_id)
            .map(|r| r.clone())
            .collect();
        Ok(newest_first(rows))
    }

    async fn list_all(&self, limit: usize) -> anyhow::Result<Vec<SwapRequest>> {
        let rows = self.records.iter().map(|r| r.clone()).collect();
        let mut rows = newest_first(rows);
        rows.truncate(limit);
        Ok(rows)
    }
}

#[derive(Debug, Clone)]
struct StoredMessage {
    seq: u64,
    partner_key: ConversationKey,
    message: Message,
}

#[derive(Default)]
struct LogInner {
    next_seq: u64,
    messages: Vec<StoredMessage>,
}

#[derive(Default)]
pub struct InMemoryConversationStore {
    inner: RwLock<LogInner>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, new: NewStoredMessage) -> anyhow::Result<Message> {
        let mut inner = self.inner.write();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let message = Message {
            id: new.id,
            swap_id: new.swap_id,
            sender_id: new.sender_id,
            recipient_id: new.recipient_id,
            body: new.body,
            item_title: new.item_title,
            created_at: Utc::now(),
        };
        inner.messages.push(StoredMessage {
            seq,
            partner_key: ConversationKey::partner(new.sender_id, new.recipient_id),
            message: message.clone(),
        });
        Ok(message)
    }

    async fn list(&self, key: ConversationKey) -> anyhow::Result<Vec<Message>> {
        // Normalize the partner variant so directly built keys match too.
        let key = match key {
            ConversationKey::Partner { a, b } => ConversationKey::partner(a, b),
            swap => swap,
        };
        let inner = self.inner.read();
        let out = inner
            .messages
            .iter()
            .filter(|stored| match key {
                ConversationKey::Swap(id) => stored.message.swap_id == Some(id),
                ConversationKey::Partner { .. } => stored.partner_key == key,
            })
            .map(|stored| stored.message.clone())
            .collect();
        Ok(out)
    }

    async fn conversation_heads(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>> {
        let inner = self.inner.read();
        // Messages are in sequence order, so the last write per pair wins.
        let mut heads: HashMap<ConversationKey, &StoredMessage> = HashMap::new();
        for stored in &inner.messages {
            if stored.message.sender_id == user_id || stored.message.recipient_id == user_id {
                heads.insert(stored.partner_key, stored);
            }
        }
        let mut rows: Vec<&StoredMessage> = heads.into_values().collect();
        rows.sort_unstable_by(|a, b| b.seq.cmp(&a.seq));
        Ok(rows.into_iter().map(|stored| stored.message.clone()).collect())
    }
}
