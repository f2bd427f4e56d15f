use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::contract::model::{ItemSnapshot, ItemStatus, UserProfile};
use crate::domain::error::DomainError;
use crate::domain::ports::{CatalogPort, DirectoryPort};

/// HTTP adapter implementing both collaborator ports against the existing
/// marketplace backend:
///  - GET  {base}/items/{id}
///  - PUT  {base}/items/{id}/status
///  - GET  {base}/users/{id}
pub struct HttpBackendClient {
    client: reqwest::Client,
    base: Url,
}

/// Wire shape of an item as the backend serves it.
#[derive(Debug, Deserialize)]
struct ItemDoc {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct UserDoc {
    id: Uuid,
    full_name: String,
    #[serde(default)]
    email: String,
}

impl HttpBackendClient {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DomainError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DomainError::dependency("invalid backend base URL"))?
            // tolerate a trailing slash on the configured base
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl TryFrom<ItemDoc> for ItemSnapshot {
    type Error = DomainError;

    fn try_from(doc: ItemDoc) -> Result<Self, Self::Error> {
        let status = ItemStatus::from_str(&doc.status)
            .map_err(|e| DomainError::dependency(format!("backend sent {e}")))?;
        Ok(ItemSnapshot {
            id: doc.id,
            owner_id: doc.owner_id,
            title: doc.title,
            status,
        })
    }
}

#[async_trait]
impl CatalogPort for HttpBackendClient {
    #[instrument(
        name = "swaps.http.catalog.item",
        skip_all,
        fields(base = %self.base, item_id = %id)
    )]
    async fn item(&self, id: Uuid) -> Result<Option<ItemSnapshot>, DomainError> {
        let url = self.endpoint(&["items", &id.to_string()])?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DomainError::dependency(format!("GET {url}: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DomainError::dependency(format!(
                "GET {url}: HTTP {}",
                response.status()
            )));
        }

        let doc: ItemDoc = response
            .json()
            .await
            .map_err(|e| DomainError::dependency(format!("GET {url}: {e}")))?;
        Ok(Some(doc.try_into()?))
    }

    #[instrument(
        name = "swaps.http.catalog.set_item_status",
        skip_all,
        fields(base = %self.base, item_id = %id, status = %status)
    )]
    async fn set_item_status(&self, id: Uuid, status: ItemStatus) -> Result<(), DomainError> {
        let url = self.endpoint(&["items", &id.to_string(), "status"])?;

        let response = self
            .client
            .put(url.clone())
            .json(&serde_json::json!({ "status": status.as_str() }))
            .send()
            .await
            .map_err(|e| DomainError::dependency(format!("PUT {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(DomainError::dependency(format!(
                "PUT {url}: HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl DirectoryPort for HttpBackendClient {
    #[instrument(
        name = "swaps.http.directory.user",
        skip_all,
        fields(base = %self.base, user_id = %id)
    )]
    async fn user(&self, id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        let url = self.endpoint(&["users", &id.to_string()])?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DomainError::dependency(format!("GET {url}: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DomainError::dependency(format!(
                "GET {url}: HTTP {}",
                response.status()
            )));
        }

        let doc: UserDoc = response
            .json()
            .await
            .map_err(|e| DomainError::dependency(format!("GET {url}: {e}")))?;
        Ok(Some(UserProfile {
            id: doc.id,
            full_name: doc.full_name,
            email: doc.email,
        }))
    }
}
