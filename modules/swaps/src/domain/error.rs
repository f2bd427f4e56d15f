use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::SwapStatus;

/// Domain-specific errors using thiserror
///
/// One variant per failure kind the callers need to tell apart: malformed
/// input, unknown id, unauthorized actor, a transition not legal from the
/// current state, a lost concurrent-transition race, a collaborator call
/// failure, and a storage failure.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Transition {from} -> {to} is not allowed")]
    InvalidTransition { from: SwapStatus, to: SwapStatus },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Dependency call failed: {message}")]
    Dependency { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn item_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "Item", id }
    }

    pub fn swap_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "Swap", id }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "User", id }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn invalid_transition(from: SwapStatus, to: SwapStatus) -> Self {
        Self::InvalidTransition { from, to }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
