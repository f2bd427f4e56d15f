// === PUBLIC CONTRACT ===
// The contract module is the only stable surface other modules may depend on.
pub mod contract;

pub use contract::{client, error, model};

// === WIRING SURFACE ===
// What a host binary needs to mount this module.
pub use api::rest::{rest_router, SwapsApiDoc};
pub use config::SwapsConfig;
pub use domain::service::{Service, ServiceConfig};
pub use gateways::local::SwapsLocalClient;

// === INTERNAL MODULES ===
// WARNING: internal implementation details, public for integration tests
// only. Depend on `contract` instead.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
