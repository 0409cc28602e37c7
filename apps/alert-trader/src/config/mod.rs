//! Configuration module for the alert trader.
//!
//! Loads a YAML file, interpolates environment variables, validates the
//! result and converts sections into the domain objects the use cases take.
//!
//! # Usage
//!
//! ```rust,ignore
//! use alert_trader::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//! let table = config.account_table()?;
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod accounts;
mod dispatcher;
mod environment;
mod observability;
mod persistence;
mod retry;
mod server;
mod trading;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use accounts::{AccountEntry, AccountsConfig, build_account_table};
pub use dispatcher::DispatcherConfig;
pub use environment::EnvironmentConfig;
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use persistence::{PersistenceBackend, PersistenceConfig};
pub use retry::RetryConfig;
pub use server::ServerConfig;
pub use trading::{TaxConfig, TradingConfig};

use crate::application::use_cases::TradingSettings;
use crate::domain::accounts::AccountTable;
use crate::domain::pairs::{PairBook, PairConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Environment configuration.
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Venue accounts.
    #[serde(default)]
    pub accounts: AccountsConfig,
    /// Configured pairs.
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
    /// Tax reservation.
    #[serde(default)]
    pub tax: TaxConfig,
    /// Trading knobs.
    #[serde(default)]
    pub trading: TradingConfig,
    /// Callback dispatcher.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    /// Ledger and queue storage.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// HTTP retry behaviour.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Validated account table.
    pub fn account_table(&self) -> Result<AccountTable, ConfigError> {
        build_account_table(&self.accounts)
    }

    /// Pair book.
    #[must_use]
    pub fn pair_book(&self) -> PairBook {
        PairBook::new(self.pairs.clone())
    }

    /// Settings for the pair-trade workflow.
    #[must_use]
    pub fn trading_settings(&self) -> TradingSettings {
        TradingSettings {
            dev_mode: self.environment.development_mode(),
            tax_rate: self.tax.rate,
            default_capital_percentage: self.trading.default_capital_percentage,
            premarket_trading: self.trading.premarket_trading,
            position_retries: self.trading.position_retries,
            recent_order_limit: self.trading.recent_order_limit,
        }
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset and empty
/// variables take the default, or become empty without one.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

fn in_unit_interval(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.webhook_token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "server.webhook_token must be set".to_string(),
        ));
    }

    if !in_unit_interval(config.tax.rate) {
        return Err(ConfigError::ValidationError(
            "tax.rate must be between 0 and 1".to_string(),
        ));
    }

    if !config.tax.financial_year_start.is_valid() {
        return Err(ConfigError::ValidationError(format!(
            "tax.financial_year_start {}/{} is not a valid day",
            config.tax.financial_year_start.day, config.tax.financial_year_start.month
        )));
    }

    let pct = config.trading.default_capital_percentage;
    if pct <= Decimal::ZERO || pct > Decimal::ONE {
        return Err(ConfigError::ValidationError(
            "trading.default_capital_percentage must be in (0, 1]".to_string(),
        ));
    }

    if config.retry.max_attempts == 0 || config.retry.quote_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "retry attempts must be at least 1".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.retry.jitter_factor) {
        return Err(ConfigError::ValidationError(
            "retry.jitter_factor must be between 0.0 and 1.0".to_string(),
        ));
    }

    for pair in &config.pairs {
        if pair.inverse_symbol.as_ref() == Some(&pair.long_symbol) {
            return Err(ConfigError::ValidationError(format!(
                "pair {} uses the same symbol for both legs",
                pair.long_symbol
            )));
        }
        if let Some(tp) = pair.take_profit_pct {
            if tp <= Decimal::ZERO {
                return Err(ConfigError::ValidationError(format!(
                    "pair {} take_profit_pct must be positive",
                    pair.long_symbol
                )));
            }
        }
    }

    if config.dispatcher.is_configured() {
        if config.dispatcher.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "dispatcher.base_url must be set when a dispatcher token is configured".to_string(),
            ));
        }
        let has_public_url = config
            .server
            .public_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty());
        if !has_public_url {
            return Err(ConfigError::ValidationError(
                "server.public_url is required for dispatcher callbacks".to_string(),
            ));
        }
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    // Building the table runs the account checks
    config.account_table()?;

    Ok(())
}
