//! Venue and dispatcher retry settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::retry::RetryPolicy;
use crate::application::services::QUOTE_ATTEMPTS;

/// `retry:` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per HTTP request.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff growth factor.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Jitter factor (0.2 = ±20%).
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
    /// Quote resolution attempts.
    #[serde(default = "default_quote_attempts")]
    pub quote_attempts: u32,
    /// HTTP request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_factor: default_jitter_factor(),
            quote_attempts: default_quote_attempts(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RetryConfig {
    /// Policy for HTTP requests.
    #[must_use]
    pub const fn http_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
            self.backoff_multiplier,
            self.jitter_factor,
        )
    }

    /// Policy for quote resolution.
    #[must_use]
    pub const fn quote_policy(&self) -> RetryPolicy {
        RetryPolicy::immediate(self.quote_attempts)
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_jitter_factor() -> f64 {
    0.2
}

const fn default_quote_attempts() -> u32 {
    QUOTE_ATTEMPTS
}

const fn default_timeout_secs() -> u64 {
    30
}
