use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::LifecyclePolicy;
use crate::domain::service::ServiceConfig;

/// Configuration for the swaps module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwapsConfig {
    /// Whether an accepted swap may still be cancelled (by either party).
    #[serde(default = "default_allow_cancel_accepted")]
    pub allow_cancel_accepted: bool,
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
    /// Maximum character count of the inbox preview line.
    #[serde(default = "default_preview_len")]
    pub preview_len: usize,
    /// Cap on the admin moderation list.
    #[serde(default = "default_max_list_len")]
    pub max_list_len: usize,
}

impl Default for SwapsConfig {
    fn default() -> Self {
        Self {
            allow_cancel_accepted: default_allow_cancel_accepted(),
            max_message_len: default_max_message_len(),
            preview_len: default_preview_len(),
            max_list_len: default_max_list_len(),
        }
    }
}

impl From<SwapsConfig> for ServiceConfig {
    fn from(config: SwapsConfig) -> Self {
        Self {
            lifecycle: LifecyclePolicy {
                allow_cancel_accepted: config.allow_cancel_accepted,
            },
            max_message_len: config.max_message_len,
            preview_len: config.preview_len,
            max_list_len: config.max_list_len,
        }
    }
}

fn default_allow_cancel_accepted() -> bool {
    true
}

fn default_max_message_len() -> usize {
    2000
}

fn default_preview_len() -> usize {
    80
}

fn default_max_list_len() -> usize {
    500
}
