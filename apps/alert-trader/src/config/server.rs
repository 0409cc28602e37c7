//! HTTP server and callback settings.

use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port for the webhook and callback endpoints.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Public base URL the dispatcher calls back on.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Token every TradingView alert must carry.
    #[serde(default)]
    pub webhook_token: String,
    /// Bearer token required on dispatcher callbacks.
    #[serde(default)]
    pub callback_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            bind_address: default_bind_address(),
            public_url: None,
            webhook_token: String::new(),
            callback_token: None,
        }
    }
}

pub(crate) const fn default_http_port() -> u16 {
    8080
}

pub(crate) fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
