//! Callback dispatcher settings.

use serde::{Deserialize, Serialize};

use crate::infrastructure::dispatcher::DEFAULT_QSTASH_URL;

/// `dispatcher:` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// QStash API base URL.
    #[serde(default = "default_dispatcher_url")]
    pub base_url: String,
    /// QStash token; scheduling is unavailable without one.
    #[serde(default)]
    pub token: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            base_url: default_dispatcher_url(),
            token: String::new(),
        }
    }
}

impl DispatcherConfig {
    /// Whether a token is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

fn default_dispatcher_url() -> String {
    DEFAULT_QSTASH_URL.to_string()
}
