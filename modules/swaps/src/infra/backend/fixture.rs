use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::contract::model::{ItemSnapshot, ItemStatus, UserProfile};
use crate::domain::error::DomainError;
use crate::domain::ports::{CatalogPort, DirectoryPort};

/// In-process stand-in for the marketplace backend, seeded from config or
/// by tests. Used by `--mock` runs.
#[derive(Default)]
pub struct FixtureBackend {
    items: DashMap<Uuid, ItemSnapshot>,
    users: DashMap<Uuid, UserProfile>,
}

impl FixtureBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_item(&self, item: ItemSnapshot) {
        self.items.insert(item.id, item);
    }

    pub fn seed_user(&self, user: UserProfile) {
        self.users.insert(user.id, user);
    }
}

#[async_trait]
impl CatalogPort for FixtureBackend {
    async fn item(&self, id: Uuid) -> Result<Option<ItemSnapshot>, DomainError> {
        Ok(self.items.get(&id).map(|i| i.clone()))
    }

    async fn set_item_status(&self, id: Uuid, status: ItemStatus) -> Result<(), DomainError> {
        let mut item = self
            .items
            .get_mut(&id)
            .ok_or_else(|| DomainError::dependency(format!("item {id} not in fixture catalog")))?;
        item.status = status;
        Ok(())
    }
}

#[async_trait]
impl DirectoryPort for FixtureBackend {
    async fn user(&self, id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}
