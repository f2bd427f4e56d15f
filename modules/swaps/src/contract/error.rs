use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::SwapStatus;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone)]
pub enum SwapsError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Transition {from} -> {to} is not allowed")]
    InvalidTransition { from: SwapStatus, to: SwapStatus },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error")]
    Internal,
}

impl SwapsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
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

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for SwapsError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Validation { message } => Self::validation(message),
            NotFound { entity, id } => Self::not_found(entity, id),
            Forbidden { message } => Self::forbidden(message),
            InvalidTransition { from, to } => Self::invalid_transition(from, to),
            Conflict { message } => Self::conflict(message),
            Dependency { .. } | Storage { .. } => Self::internal(),
        }
    }
}
