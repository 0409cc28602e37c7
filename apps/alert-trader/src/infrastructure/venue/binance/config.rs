//! Binance adapter configuration.

use std::time::Duration;

use crate::application::retry::RetryPolicy;
use crate::domain::accounts::AccountCredentials;

/// Binance environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinanceEnvironment {
    /// Spot testnet.
    Testnet,
    /// Production.
    Live,
}

impl BinanceEnvironment {
    /// REST base URL.
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::Testnet => "https://testnet.binance.vision",
            Self::Live => "https://api.binance.com",
        }
    }
}

impl std::fmt::Display for BinanceEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Testnet => write!(f, "TESTNET"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

/// Configuration for the Binance venue adapter.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// API key, sent as `X-MBX-APIKEY`.
    pub api_key: String,
    /// Secret used for request signatures.
    pub secret_key: String,
    /// Environment.
    pub environment: BinanceEnvironment,
    /// REST base URL.
    pub base_url: String,
    /// `recvWindow` for signed requests, in milliseconds.
    pub recv_window_ms: u64,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy for transport failures.
    pub retry: RetryPolicy,
}

impl BinanceConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(api_key: String, secret_key: String, environment: BinanceEnvironment) -> Self {
        Self {
            api_key,
            secret_key,
            environment,
            base_url: environment.base_url().to_string(),
            recv_window_ms: 5000,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    /// Configuration for a resolved account. Paper accounts trade on the
    /// testnet; a custom endpoint replaces the base URL.
    #[must_use]
    pub fn from_credentials(credentials: &AccountCredentials) -> Self {
        let environment = if credentials.is_paper {
            BinanceEnvironment::Testnet
        } else {
            BinanceEnvironment::Live
        };
        let config = Self::new(
            credentials.key.clone(),
            credentials.secret.clone(),
            environment,
        );
        match &credentials.endpoint {
            Some(endpoint) => config.with_base_url(endpoint.clone()),
            None => config,
        }
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
