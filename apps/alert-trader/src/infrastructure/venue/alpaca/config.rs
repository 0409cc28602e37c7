//! Alpaca adapter configuration.

use std::time::Duration;

use crate::application::retry::RetryPolicy;
use crate::domain::accounts::AccountCredentials;

/// Environment for Alpaca API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlpacaEnvironment {
    /// Paper trading (simulated).
    Paper,
    /// Live trading (real money).
    Live,
}

impl AlpacaEnvironment {
    /// Get the base URL for the trading API.
    #[must_use]
    pub const fn trading_base_url(&self) -> &'static str {
        match self {
            Self::Paper => "https://paper-api.alpaca.markets",
            Self::Live => "https://api.alpaca.markets",
        }
    }

    /// Get the base URL for the market data API.
    #[must_use]
    pub const fn data_base_url(&self) -> &'static str {
        "https://data.alpaca.markets"
    }

    /// Check if this is live trading.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl std::fmt::Display for AlpacaEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paper => write!(f, "PAPER"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

/// Configuration for the Alpaca venue adapter.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
    /// Trading environment.
    pub environment: AlpacaEnvironment,
    /// Trading API base URL.
    pub trading_base_url: String,
    /// Market data API base URL.
    pub data_base_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy for transport failures.
    pub retry: RetryPolicy,
}

impl AlpacaConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(api_key: String, api_secret: String, environment: AlpacaEnvironment) -> Self {
        Self {
            api_key,
            api_secret,
            environment,
            trading_base_url: environment.trading_base_url().to_string(),
            data_base_url: environment.data_base_url().to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    /// Configuration for a resolved account; a custom endpoint replaces the
    /// trading base URL.
    #[must_use]
    pub fn from_credentials(credentials: &AccountCredentials) -> Self {
        let environment = if credentials.is_paper {
            AlpacaEnvironment::Paper
        } else {
            AlpacaEnvironment::Live
        };
        let config = Self::new(
            credentials.key.clone(),
            credentials.secret.clone(),
            environment,
        );
        match &credentials.endpoint {
            Some(endpoint) => {
                let data = config.data_base_url.clone();
                config.with_base_urls(endpoint.clone(), data)
            }
            None => config,
        }
    }

    /// Override both base URLs.
    #[must_use]
    pub fn with_base_urls(mut self, trading: impl Into<String>, data: impl Into<String>) -> Self {
        self.trading_base_url = trading.into().trim_end_matches('/').to_string();
        self.data_base_url = data.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_environment_urls() {
        let env = AlpacaEnvironment::Paper;
        assert!(env.trading_base_url().contains("paper"));
        assert!(!env.is_live());
    }

    #[test]
    fn live_environment_urls() {
        let env = AlpacaEnvironment::Live;
        assert!(!env.trading_base_url().contains("paper"));
        assert!(env.is_live());
    }

    #[test]
    fn paper_credentials_select_paper_environment() {
        let config =
            AlpacaConfig::from_credentials(&AccountCredentials::new("key", "secret", true));
        assert_eq!(config.environment, AlpacaEnvironment::Paper);
        assert_eq!(config.trading_base_url, "https://paper-api.alpaca.markets");
        assert!(config.data_base_url.contains("data.alpaca"));
    }

    #[test]
    fn endpoint_overrides_trading_url_only() {
        let credentials = AccountCredentials::new("key", "secret", false)
            .with_endpoint("https://broker.example.com/");
        let config = AlpacaConfig::from_credentials(&credentials);
        assert_eq!(config.trading_base_url, "https://broker.example.com");
        assert_eq!(config.data_base_url, "https://data.alpaca.markets");
    }

    #[test]
    fn config_with_timeout() {
        let config = AlpacaConfig::new(
            "key".to_string(),
            "secret".to_string(),
            AlpacaEnvironment::Paper,
        )
        .with_timeout(Duration::from_secs(60));
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn environment_display() {
        assert_eq!(format!("{}", AlpacaEnvironment::Paper), "PAPER");
        assert_eq!(format!("{}", AlpacaEnvironment::Live), "LIVE");
    }
}
