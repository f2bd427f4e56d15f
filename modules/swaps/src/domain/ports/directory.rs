use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::UserProfile;
use crate::domain::error::DomainError;

/// Transport-agnostic port to the user directory collaborator.
#[async_trait]
pub trait DirectoryPort: Send + Sync {
    /// Look up a user. `Ok(None)` when the id does not resolve.
    async fn user(&self, id: Uuid) -> Result<Option<UserProfile>, DomainError>;
}
