//! Caller identity extracted from trusted gateway headers.
//!
//! Tradepost services sit behind an authenticating gateway that verifies the
//! session and forwards the caller as `x-user-id` / `x-user-role` headers.
//! Extraction is fail-closed: a missing or malformed identity is a 401, never
//! an anonymous pass-through.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::problem::{self, ProblemResponse};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRole {
    User,
    Admin,
}

/// The authenticated caller of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: IdentityRole,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == IdentityRole::Admin
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw_id = header_str(parts, USER_ID_HEADER)
            .ok_or_else(|| problem::unauthorized("missing x-user-id header"))?;

        let user_id = Uuid::parse_str(raw_id)
            .map_err(|_| problem::unauthorized("x-user-id is not a valid UUID"))?;

        let role = match header_str(parts, USER_ROLE_HEADER) {
            None => IdentityRole::User,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "user" => IdentityRole::User,
                "admin" => IdentityRole::Admin,
                _ => return Err(problem::unauthorized("unrecognized x-user-role")),
            },
        };

        Ok(Identity { user_id, role })
    }
}
