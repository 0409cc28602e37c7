//! Alpaca-specific error types.

use thiserror::Error;

use crate::application::ports::VenueError;

/// Errors from the Alpaca adapter.
#[derive(Debug, Error, Clone)]
pub enum AlpacaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// API returned an error.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the API.
        code: String,
        /// Error message from the API.
        message: String,
    },

    /// Order was rejected.
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Authentication failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited.
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
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// Resource not found (position, asset, quote).
    #[error("Not found: {resource}")]
    NotFound {
        /// Request path.
        resource: String,
    },
}

impl From<AlpacaError> for VenueError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Http(msg) | AlpacaError::Network(msg) | AlpacaError::JsonParse(msg) => {
                Self::ConnectionError { message: msg }
            }
            AlpacaError::Api { code, message } => Self::Unknown {
                message: format!("{}: {}", code, message),
            },
            AlpacaError::InvalidField { field, value } => Self::Unknown {
                message: format!("invalid {field}: {value}"),
            },
            AlpacaError::OrderRejected(msg) => Self::OrderRejected { reason: msg },
            AlpacaError::AuthenticationFailed => Self::AuthenticationFailed,
            AlpacaError::RateLimited => Self::RateLimited,
            AlpacaError::MaxRetriesExceeded { attempts } => Self::ConnectionError {
                message: format!("Max retries exceeded after {} attempts", attempts),
            },
            AlpacaError::NotFound { resource } => Self::NotFound { resource },
        }
    }
}
