//! Dispatcher Port (Driven Port)
//!
//! At-least-once delivery of delayed HTTP callbacks and one-shot cron
//! schedules.

use async_trait::async_trait;

use crate::domain::scheduling::CronExpression;

/// Dispatcher error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    /// Required dispatcher settings are missing.
    #[error("Dispatcher misconfigured: {0}")]
    Misconfigured(String),

    /// The dispatcher refused the request.
    #[error("Dispatcher rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status returned.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Transport failure.
    #[error("Dispatcher transport error: {0}")]
    Transport(String),
}

/// Deliver `payload` to `url` after `delay_seconds`.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    /// Callback URL.
    pub url: String,
    /// Delay before delivery.
    pub delay_seconds: u64,
    /// JSON body.
    pub payload: serde_json::Value,
}

/// Call `url` on the schedule described by `cron`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronRequest {
    /// Callback URL.
    pub url: String,
    /// UTC cron expression.
    pub cron: CronExpression,
}

/// Port for the external message dispatcher.
#[async_trait]
pub trait DispatcherPort: Send + Sync {
    /// Publish a delayed message.
    async fn dispatch(&self, request: DispatchRequest) -> Result<(), DispatchError>;

    /// Create a cron schedule.
    async fn schedule_cron(&self, request: CronRequest) -> Result<(), DispatchError>;
}
