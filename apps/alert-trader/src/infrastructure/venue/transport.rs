//! HTTP transport with retry logic shared by the venue clients.
//!
//! Requests are rebuilt for every attempt so signed venues can refresh their
//! timestamp and signature.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};

use crate::application::retry::{ExponentialBackoff, RetryPolicy};

/// Failure of a request after retry handling.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request could not be built or sent.
    #[error("Network error: {0}")]
    Network(String),

    /// The venue answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body.
        body: String,
    },

    /// Retryable failures persisted through every attempt.
    #[error("Max retries exceeded after {attempts} attempts: {last}")]
    MaxRetriesExceeded {
        /// Attempts made.
        attempts: u32,
        /// Last failure seen.
        last: String,
    },
}

/// Error category for determining retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 429; honour `Retry-After` when present.
    RateLimited,
    /// Transient server-side failure.
    Retryable,
    /// Client error or anything else.
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
#[must_use]
pub const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Send the request produced by `build`, retrying per `policy`.
///
/// Returns the response body of the first successful attempt.
pub async fn send_with_retry<F>(
    policy: &RetryPolicy,
    venue: &str,
    build: F,
) -> Result<String, TransportError>
where
    F: Fn() -> Result<RequestBuilder, TransportError>,
{
    let mut backoff = ExponentialBackoff::new(policy);

    loop {
        let response = match build()?.send().await {
            Ok(response) => response,
            Err(e) => {
                if let Some(delay) = backoff.next_backoff() {
                    tracing::warn!(
                        venue,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        attempt = backoff.attempts_made(),
                        "Network error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(TransportError::MaxRetriesExceeded {
                    attempts: backoff.attempts_made(),
                    last: e.to_string(),
                });
            }
        };

        let status = response.status();
        if status.is_success() {
            return response
                .text()
                .await
                .map_err(|e| TransportError::Network(e.to_string()));
        }

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();

        let delay = match categorize_status(status) {
            ErrorCategory::RateLimited => {
                let next = backoff.next_backoff();
                next.map(|d| retry_after.map_or(d, Duration::from_secs))
            }
            ErrorCategory::Retryable => backoff.next_backoff(),
            ErrorCategory::NonRetryable => {
                return Err(TransportError::Status { status, body });
            }
        };

        match delay {
            Some(delay) => {
                tracing::warn!(
                    venue,
                    status = status.as_u16(),
                    body = %body,
                    delay_ms = delay.as_millis() as u64,
                    "Retryable status, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            None if status == StatusCode::TOO_MANY_REQUESTS => {
                return Err(TransportError::Status { status, body });
            }
            None => {
                return Err(TransportError::MaxRetriesExceeded {
                    attempts: backoff.attempts_made(),
                    last: format!("HTTP {status}: {body}"),
                });
            }
        }
    }
}
