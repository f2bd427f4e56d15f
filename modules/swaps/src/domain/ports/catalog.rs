use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{ItemSnapshot, ItemStatus};
use crate::domain::error::DomainError;

/// Transport-agnostic port to the item catalog collaborator:
/// 1) item lookup (GET)
/// 2) item status push after a committed transition (PUT)
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Look up an item. `Ok(None)` when the id does not resolve.
    async fn item(&self, id: Uuid) -> Result<Option<ItemSnapshot>, DomainError>;
    /// Push a status change to the catalog.
    async fn set_item_status(&self, id: Uuid, status: ItemStatus) -> Result<(), DomainError>;
}
