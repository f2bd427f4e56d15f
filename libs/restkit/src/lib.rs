//! Shared REST plumbing for Tradepost services: RFC 9457 problem responses,
//! request-id propagation, caller identity extraction, and the standard
//! middleware stack.

pub mod identity;
pub mod middleware;
pub mod problem;

pub use identity::{Identity, IdentityRole};
pub use middleware::{apply_http_layers, HttpLayerConfig, RequestIdValue};
pub use problem::{Problem, ProblemResponse};
