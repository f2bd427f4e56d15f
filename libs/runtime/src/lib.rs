//! Process-level runtime support for Tradepost binaries: layered
//! configuration loading and logging bootstrap.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CatalogConfig, CatalogMode, CliArgs, FixtureItem,
    FixtureUser, LoggingConfig, Section, ServerConfig,
};
