//! Binance-specific error types.

use thiserror::Error;

use crate::application::ports::VenueError;

/// Errors from the Binance adapter.
#[derive(Debug, Error, Clone)]
pub enum BinanceError {
    /// API returned an error payload.
    #[error("API error {code}: {message}")]
    Api {
        /// Binance error code (negative) or HTTP status.
        code: i64,
        /// Error message.
        message: String,
    },

    /// Order was rejected.
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Key or signature refused.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited or IP banned.
    #[error("Rate limited")]
    RateLimited,

    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// A response field did not hold a usable value.
    #[error("Invalid response field {field}: {value}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Raw value.
        value: String,
    },

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made.
        attempts: u32,
    },

    /// Symbol, asset or balance absent.
    #[error("Not found: {resource}")]
    NotFound {
        /// What was looked up.
        resource: String,
    },
}

impl From<BinanceError> for VenueError {
    fn from(err: BinanceError) -> Self {
        match err {
            BinanceError::Network(msg) | BinanceError::JsonParse(msg) => {
                Self::ConnectionError { message: msg }
            }
            BinanceError::Api { code, message } => Self::Unknown {
                message: format!("{code}: {message}"),
            },
            BinanceError::InvalidField { field, value } => Self::Unknown {
                message: format!("invalid {field}: {value}"),
            },
            BinanceError::OrderRejected(reason) => Self::OrderRejected { reason },
            BinanceError::AuthenticationFailed => Self::AuthenticationFailed,
            BinanceError::RateLimited => Self::RateLimited,
            BinanceError::MaxRetriesExceeded { attempts } => Self::ConnectionError {
                message: format!("Max retries exceeded after {attempts} attempts"),
            },
            BinanceError::NotFound { resource } => Self::NotFound { resource },
        }
    }
}
