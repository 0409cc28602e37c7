//! Retry policy with exponential backoff.
//!
//! One parameterized policy is shared by every retried operation: venue HTTP
//! transport, the quote resolver and the position reader. Callers supply the
//! operation and a predicate classifying which failures are worth retrying.
//!
//! # Example
//!
//! ```rust,ignore
//! use alert_trader::application::retry::{RetryPolicy, retry_with};
//!
//! let policy = RetryPolicy::immediate(3);
//! let quote = retry_with(&policy, "latest_quote", |_attempt| venue.get_latest_quote(&symbol), |_| true).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first (minimum 1).
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub initial_backoff: Duration,
    /// Upper bound on any delay.
    pub max_backoff: Duration,
    /// Growth factor between consecutive delays.
    pub backoff_multiplier: f64,
    /// Jitter factor for randomization (0.2 = ±20%).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with custom settings.
    #[must_use]
    pub const fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        backoff_multiplier: f64,
        jitter_factor: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
            backoff_multiplier,
            jitter_factor,
        }
    }

    /// Retry back to back with no delay.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::fixed(max_attempts, Duration::ZERO)
    }

    /// Retry with the same delay between every attempt.
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff: delay,
            max_backoff: delay,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }

    /// Attempts the policy allows, never less than one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Calculator for exponential backoff with jitter.
#[derive(Debug)]
pub struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
    jitter_factor: f64,
}

impl ExponentialBackoff {
    /// Create a calculator from a policy.
    #[must_use]
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 0,
            max_attempts: policy.attempts(),
            current_backoff: policy.initial_backoff,
            max_backoff: policy.max_backoff,
            multiplier: policy.backoff_multiplier,
            jitter_factor: policy.jitter_factor,
        }
    }

    /// Record a failed attempt and return the delay before the next one.
    ///
    /// Returns `None` once the policy's attempts are used up.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(self.apply_jitter(backoff).min(self.max_backoff))
    }

    /// Failed attempts recorded so far.
    #[must_use]
    pub const fn attempts_made(&self) -> u32 {
        self.attempt
    }

    fn apply_jitter(&self, backoff: Duration) -> Duration {
        if self.jitter_factor <= 0.0 || backoff.is_zero() {
            return backoff;
        }
        let base = backoff.as_secs_f64();
        let range = base * self.jitter_factor;
        let jittered = rand::rng().random_range((base - range).max(0.0)..=base + range);
        Duration::from_secs_f64(jittered)
    }
}

/// Why a retried operation gave up.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every allowed attempt failed with a retryable error.
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Last error seen.
        last: E,
    },
    /// An error the predicate classified as not retryable.
    Aborted {
        /// Attempt on which it occurred.
        attempt: u32,
        /// The error.
        error: E,
    },
}

impl<E> RetryError<E> {
    /// Attempts made before giving up.
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            Self::Aborted { attempt, .. } => *attempt,
        }
    }

    /// The final error.
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { last, .. } => last,
            Self::Aborted { error, .. } => error,
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy runs out of attempts. The operation receives the 1-based
/// attempt number.
pub async fn retry_with<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
    is_retryable: P,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut backoff = ExponentialBackoff::new(policy);

    loop {
        let attempt = backoff.attempts_made() + 1;
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if !is_retryable(&error) => {
                return Err(RetryError::Aborted { attempt, error });
            }
            Err(error) => match backoff.next_backoff() {
                Some(delay) => {
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = policy.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Attempt failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                None => {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }
            },
        }
    }
}
