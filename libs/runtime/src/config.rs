use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::paths::resolve_home_dir;

/// Top-level configuration: typed global sections plus an untyped
/// per-module bag that each module deserializes on its own.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Marketplace backend (item catalog + user directory).
    pub catalog: Option<CatalogConfig>,
    /// Absent means built-in defaults.
    pub logging: Option<LoggingConfig>,
    /// module name -> raw value, decoded by the owning module.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Rewritten to an absolute path during load.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub timeout_sec: u64,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_enable_docs")]
    pub enable_docs: bool,
}

/// How the marketplace backend is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogMode {
    /// Talk to a real backend over HTTP.
    Http,
    /// Serve items/users from the inline fixture lists below.
    Fixture,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_mode")]
    pub mode: CatalogMode,
    /// Base URL of the backend exposing `/api/items/{id}` and `/api/users/{id}`.
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    /// Seed items for fixture mode.
    #[serde(default)]
    pub items: Vec<FixtureItem>,
    /// Seed users for fixture mode.
    #[serde(default)]
    pub users: Vec<FixtureUser>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mode: default_catalog_mode(),
            base_url: default_catalog_base_url(),
            items: Vec::new(),
            users: Vec::new(),
        }
    }
}

/// A catalog item seeded into the fixture backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    /// One of `available|reserved|exchanged|hidden`; validated at wiring time.
    #[serde(default = "default_item_status")]
    pub status: String,
}

/// A directory user seeded into the fixture backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureUser {
    pub id: Uuid,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

/// Map of target name to logging settings. The `"default"` key is the
/// catch-all and the only one that opens the file sink; every other key
/// adjusts the level for that target prefix.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    /// "trace".."error", or "off" to silence the console.
    pub console_level: String,
    /// Log file path, relative paths land under `server.home_dir`. Empty
    /// disables the file sink.
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty picks the platform location: $HOME/.tradepost on
            // Unix, %APPDATA%\.tradepost on Windows.
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8095,
            timeout_sec: 0,
            cors_enabled: false,
            enable_docs: true,
        }
    }
}

pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/tradepost.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            catalog: Some(CatalogConfig::default()),
            logging: Some(default_logging_config()),
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Layered load: built-in defaults, then the YAML file, then `APP__*`
    /// environment variables. `server.home_dir` comes back absolute and the
    /// directory exists afterwards.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        // Yaml::file silently skips missing files; an explicitly named
        // config that does not exist should fail loudly instead.
        if !config_path.as_ref().exists() {
            anyhow::bail!("Config file not found: {}", config_path.as_ref().display());
        }

        // The layering base leaves optional sections at None so a section
        // only exists when YAML or the environment actually provides it.
        let base = AppConfig {
            server: ServerConfig::default(),
            catalog: None,
            logging: None,
            modules: HashMap::new(),
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path.as_ref()))
            // APP__SERVER__PORT=8095 addresses server.port
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment.extract().context("Invalid configuration")?;

        canonicalize_home_dir(&mut config.server)
            .context("Failed to resolve server.home_dir")?;

        Ok(config)
    }

    /// Load from `config_path` when given, otherwise fall back to the
    /// built-in defaults. Either way `server.home_dir` is normalized.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                canonicalize_home_dir(&mut c.server)
                    .context("Failed to resolve server.home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Fold command line flags into the loaded config. `-v`/`-vv` raise the
    /// console level of the `"default"` logging section.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            match args.verbose {
                0 => {}
                1 => default_section.console_level = "debug".to_string(),
                _ => default_section.console_level = "trace".to_string(),
            }
        }
    }
}

/// Command line arguments relevant to configuration loading.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

const fn default_subdir() -> &'static str {
    ".tradepost"
}

fn default_enable_docs() -> bool {
    true
}

fn default_catalog_mode() -> CatalogMode {
    CatalogMode::Http
}

fn default_catalog_base_url() -> String {
    "http://127.0.0.1:5000/api".to_string()
}

fn default_item_status() -> String {
    "available".to_string()
}

/// Expand and absolutize `server.home_dir`, creating the directory.
fn canonicalize_home_dir(server: &mut ServerConfig) -> Result<()> {
    // An empty string means "not configured".
    let explicit = if server.home_dir.trim().is_empty() {
        None
    } else {
        Some(server.home_dir.clone())
    };

    let resolved: PathBuf = resolve_home_dir(explicit, default_subdir(), true)
        .context("home_dir resolution failed")?;

    server.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}
