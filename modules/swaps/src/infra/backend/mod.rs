pub mod fixture;
pub mod http;

pub use fixture::FixtureBackend;
pub use http::HttpBackendClient;
