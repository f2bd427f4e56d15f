use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    Caller, ConversationKey, ConversationSummary, ItemStatus, Message, MessageView,
    NewSwapRequest, SwapOverview, SwapRequest, SwapStatus, UserProfile,
};
use crate::domain::error::DomainError;
use crate::domain::lifecycle::{self, LifecyclePolicy};
use crate::domain::ports::{CatalogPort, DirectoryPort};
use crate::domain::repo::{ConversationStore, NewStoredMessage, StatusCas, SwapLedger};

/// Domain service with the business rules of the swap lifecycle and its
/// messaging. Depends only on ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    ledger: Arc<dyn SwapLedger>,
    conversations: Arc<dyn ConversationStore>,
    catalog: Arc<dyn CatalogPort>,
    directory: Arc<dyn DirectoryPort>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub lifecycle: LifecyclePolicy,
    pub max_message_len: usize,
    pub preview_len: usize,
    pub max_list_len: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            lifecycle: LifecyclePolicy::default(),
            max_message_len: 2000,
            preview_len: 80,
            max_list_len: 500,
        }
    }
}

/// Item status to push to the catalog after a committed transition, if any.
fn item_side_effect(from: SwapStatus, to: SwapStatus) -> Option<ItemStatus> {
    match (from, to) {
        (SwapStatus::Pending, SwapStatus::Accepted) => Some(ItemStatus::Reserved),
        (SwapStatus::Accepted, SwapStatus::Completed) => Some(ItemStatus::Exchanged),
        (SwapStatus::Accepted, SwapStatus::Cancelled) => Some(ItemStatus::Available),
        _ => None,
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        ledger: Arc<dyn SwapLedger>,
        conversations: Arc<dyn ConversationStore>,
        catalog: Arc<dyn CatalogPort>,
        directory: Arc<dyn DirectoryPort>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            ledger,
            conversations,
            catalog,
            directory,
            config,
        }
    }

    #[instrument(
        name = "swaps.service.create_swap",
        skip(self),
        fields(item_id = %new_request.item_id, requester = %caller.user_id)
    )]
    pub async fn create_swap(
        &self,
        caller: Caller,
        new_request: NewSwapRequest,
    ) -> Result<SwapRequest, DomainError> {
        info!("Creating swap request");

        let message = self.normalize_optional_message(new_request.message)?;

        let item = self
            .catalog
            .item(new_request.item_id)
            .await?
            .ok_or_else(|| DomainError::item_not_found(new_request.item_id))?;

        if item.owner_id == caller.user_id {
            return Err(DomainError::validation("cannot request your own item"));
        }
        if item.status != ItemStatus::Available {
            return Err(DomainError::validation(format!(
                "item is not available (status: {})",
                item.status
            )));
        }

        if self
            .ledger
            .active_exists(item.id, caller.user_id)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?
        {
            return Err(DomainError::conflict(
                "an active request for this item already exists",
            ));
        }

        let now = Utc::now();
        let request = SwapRequest {
            id: Uuid::new_v4(),
            item_id: item.id,
            requester_id: caller.user_id,
            owner_id: item.owner_id,
            message,
            status: SwapStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.ledger
            .insert(request.clone())
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        info!("Successfully created swap request with id={}", request.id);
        Ok(request)
    }

    #[instrument(
        name = "swaps.service.set_status",
        skip(self),
        fields(swap_id = %swap_id, next = %next, actor = %caller.user_id)
    )]
    pub async fn set_status(
        &self,
        caller: Caller,
        swap_id: Uuid,
        next: SwapStatus,
    ) -> Result<SwapRequest, DomainError> {
        info!("Applying swap transition");

        let request = self
            .ledger
            .find_by_id(swap_id)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?
            .ok_or_else(|| DomainError::swap_not_found(swap_id))?;

        lifecycle::check(&request, caller.user_id, next, &self.config.lifecycle)?;

        // CAS against the status we validated; a concurrent transition that
        // lands in between surfaces as Conflict, never as a picked winner.
        let updated = match self
            .ledger
            .set_status_if(swap_id, request.status, next, Utc::now())
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?
        {
            StatusCas::Updated(updated) => updated,
            StatusCas::Raced { current } => {
                return Err(DomainError::conflict(format!(
                    "swap status changed concurrently (now {current})"
                )));
            }
            StatusCas::Missing => return Err(DomainError::swap_not_found(swap_id)),
        };

        // Post-commit side effect; a failing catalog call never rolls back
        // the committed transition.
        if let Some(status) = item_side_effect(request.status, next) {
            if let Err(e) = self.catalog.set_item_status(updated.item_id, status).await {
                warn!("Catalog status push failed (continuing): {}", e);
            }
        }

        info!("Successfully moved swap to {}", updated.status);
        Ok(updated)
    }

    #[instrument(name = "swaps.service.list_outgoing", skip(self), fields(user = %caller.user_id))]
    pub async fn list_outgoing(&self, caller: Caller) -> Result<Vec<SwapOverview>, DomainError> {
        debug!("Listing outgoing swap requests");

        let rows = self
            .ledger
            .list_by_requester(caller.user_id)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        let out = self.overview_rows(rows, caller.user_id).await?;
        debug!("Listed {} outgoing swap requests", out.len());
        Ok(out)
    }

    #[instrument(name = "swaps.service.list_incoming", skip(self), fields(user = %caller.user_id))]
    pub async fn list_incoming(&self, caller: Caller) -> Result<Vec<SwapOverview>, DomainError> {
        debug!("Listing incoming swap requests");

        let rows = self
            .ledger
            .list_by_owner(caller.user_id)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        let out = self.overview_rows(rows, caller.user_id).await?;
        debug!("Listed {} incoming swap requests", out.len());
        Ok(out)
    }

    #[instrument(name = "swaps.service.list_all_swaps", skip(self), fields(user = %caller.user_id))]
    pub async fn list_all_swaps(&self, caller: Caller) -> Result<Vec<SwapOverview>, DomainError> {
        debug!("Listing all swap requests");

        if !caller.is_admin() {
            return Err(DomainError::forbidden("admin role required"));
        }

        let rows = self
            .ledger
            .list_all(self.config.max_list_len)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        self.overview_rows(rows, caller.user_id).await
    }

    #[instrument(
        name = "swaps.service.send_swap_message",
        skip(self, body),
        fields(swap_id = %swap_id, sender = %caller.user_id)
    )]
    pub async fn send_swap_message(
        &self,
        caller: Caller,
        swap_id: Uuid,
        body: String,
    ) -> Result<Message, DomainError> {
        debug!("Appending message to swap conversation");

        let body = self.normalize_body(body)?;

        let request = self
            .ledger
            .find_by_id(swap_id)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?
            .ok_or_else(|| DomainError::swap_not_found(swap_id))?;

        let recipient_id = request
            .counterparty(caller.user_id)
            .ok_or_else(|| DomainError::forbidden("not a party to this conversation"))?;

        // Breadcrumb so the partner-scoped view keeps item context. An item
        // deleted since the request was created degrades to no title.
        let item_title = self.catalog.item(request.item_id).await?.map(|i| i.title);

        let message = self
            .conversations
            .append(NewStoredMessage {
                id: Uuid::new_v4(),
                swap_id: Some(swap_id),
                sender_id: caller.user_id,
                recipient_id,
                item_title,
                body,
            })
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        info!("Message {} appended to swap {}", message.id, swap_id);
        Ok(message)
    }

    #[instrument(
        name = "swaps.service.list_swap_messages",
        skip(self),
        fields(swap_id = %swap_id, user = %caller.user_id)
    )]
    pub async fn list_swap_messages(
        &self,
        caller: Caller,
        swap_id: Uuid,
    ) -> Result<Vec<MessageView>, DomainError> {
        debug!("Listing swap conversation");

        let request = self
            .ledger
            .find_by_id(swap_id)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?
            .ok_or_else(|| DomainError::swap_not_found(swap_id))?;

        if !request.is_party(caller.user_id) {
            return Err(DomainError::forbidden("not a party to this conversation"));
        }

        let messages = self
            .conversations
            .list(ConversationKey::swap(swap_id))
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        self.annotate_senders(messages).await
    }

    #[instrument(
        name = "swaps.service.send_partner_message",
        skip(self, body),
        fields(partner = %partner_id, sender = %caller.user_id)
    )]
    pub async fn send_partner_message(
        &self,
        caller: Caller,
        partner_id: Uuid,
        body: String,
    ) -> Result<Message, DomainError> {
        debug!("Appending direct message");

        let body = self.normalize_body(body)?;

        if partner_id == caller.user_id {
            return Err(DomainError::validation("cannot message yourself"));
        }
        self.directory
            .user(partner_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(partner_id))?;

        let message = self
            .conversations
            .append(NewStoredMessage {
                id: Uuid::new_v4(),
                swap_id: None,
                sender_id: caller.user_id,
                recipient_id: partner_id,
                item_title: None,
                body,
            })
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        info!("Message {} appended for partner {}", message.id, partner_id);
        Ok(message)
    }

    #[instrument(
        name = "swaps.service.list_partner_messages",
        skip(self),
        fields(partner = %partner_id, user = %caller.user_id)
    )]
    pub async fn list_partner_messages(
        &self,
        caller: Caller,
        partner_id: Uuid,
    ) -> Result<Vec<MessageView>, DomainError> {
        debug!("Listing partner conversation");

        self.directory
            .user(partner_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(partner_id))?;

        let messages = self
            .conversations
            .list(ConversationKey::partner(caller.user_id, partner_id))
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        self.annotate_senders(messages).await
    }

    #[instrument(name = "swaps.service.list_conversations", skip(self), fields(user = %caller.user_id))]
    pub async fn list_conversations(
        &self,
        caller: Caller,
    ) -> Result<Vec<ConversationSummary>, DomainError> {
        debug!("Listing conversation inbox");

        let heads = self
            .conversations
            .conversation_heads(caller.user_id)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        let mut profiles: HashMap<Uuid, Option<UserProfile>> = HashMap::new();
        let mut out = Vec::with_capacity(heads.len());
        for head in heads {
            let partner_id = head.partner_of(caller.user_id);
            let partner_name = self
                .cached_profile(&mut profiles, partner_id)
                .await?
                .map(|p| p.full_name);
            out.push(ConversationSummary {
                partner_id,
                partner_name,
                last_message_preview: self.preview(&head.body),
                last_message_at: head.created_at,
            });
        }

        debug!("Listed {} conversations", out.len());
        Ok(out)
    }

    // --- projection helpers ---

    /// Annotate ledger rows with display fields and the viewer's allowed
    /// actions. Lookups are memoized per call; an unresolvable item or user
    /// degrades that field, never the row.
    async fn overview_rows(
        &self,
        rows: Vec<SwapRequest>,
        viewer: Uuid,
    ) -> Result<Vec<SwapOverview>, DomainError> {
        let mut titles: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut profiles: HashMap<Uuid, Option<UserProfile>> = HashMap::new();

        let mut out = Vec::with_capacity(rows.len());
        for request in rows {
            if !titles.contains_key(&request.item_id) {
                let title = self.catalog.item(request.item_id).await?.map(|i| i.title);
                titles.insert(request.item_id, title);
            }
            let item_title = titles.get(&request.item_id).cloned().flatten();

            let requester = self
                .cached_profile(&mut profiles, request.requester_id)
                .await?;
            let owner = self.cached_profile(&mut profiles, request.owner_id).await?;

            let allowed_actions = lifecycle::allowed_for(&request, viewer, &self.config.lifecycle);
            out.push(SwapOverview {
                request,
                item_title,
                requester,
                owner,
                allowed_actions,
            });
        }
        Ok(out)
    }

    async fn cached_profile(
        &self,
        cache: &mut HashMap<Uuid, Option<UserProfile>>,
        id: Uuid,
    ) -> Result<Option<UserProfile>, DomainError> {
        if !cache.contains_key(&id) {
            let profile = self.directory.user(id).await?;
            cache.insert(id, profile);
        }
        Ok(cache.get(&id).cloned().flatten())
    }

    async fn annotate_senders(
        &self,
        messages: Vec<Message>,
    ) -> Result<Vec<MessageView>, DomainError> {
        let mut profiles: HashMap<Uuid, Option<UserProfile>> = HashMap::new();
        let mut out = Vec::with_capacity(messages.len());
        for message in messages {
            let sender_name = self
                .cached_profile(&mut profiles, message.sender_id)
                .await?
                .map(|p| p.full_name);
            out.push(MessageView {
                message,
                sender_name,
            });
        }
        Ok(out)
    }

    fn preview(&self, body: &str) -> String {
        let max = self.config.preview_len;
        if body.chars().count() <= max {
            body.to_string()
        } else {
            let cut: String = body.chars().take(max).collect();
            format!("{cut}...")
        }
    }

    // --- validation helpers ---

    fn normalize_body(&self, body: String) -> Result<String, DomainError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("message body is empty"));
        }
        if trimmed.chars().count() > self.config.max_message_len {
            return Err(DomainError::validation(format!(
                "message body exceeds {} characters",
                self.config.max_message_len
            )));
        }
        Ok(trimmed.to_string())
    }

    /// The optional free-text note on a swap request: trimmed, empty
    /// collapses to None, same length cap as chat messages.
    fn normalize_optional_message(
        &self,
        message: Option<String>,
    ) -> Result<Option<String>, DomainError> {
        match message {
            None => Ok(None),
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                if trimmed.chars().count() > self.config.max_message_len {
                    return Err(DomainError::validation(format!(
                        "message exceeds {} characters",
                        self.config.max_message_len
                    )));
                }
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}
