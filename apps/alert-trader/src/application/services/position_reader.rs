//! Position Reader
//!
//! Retried position reads that never fail outright: exhaustion yields
//! [`PositionLookup::Absent`] so callers decide whether absence is fatal.

use std::time::Duration;

use crate::application::ports::VenuePort;
use crate::application::retry::{RetryPolicy, retry_with};
use crate::domain::market::{AbsenceReason, PositionLookup};
use crate::domain::shared::Symbol;
use crate::observability::record_position_absent;

/// Default wait between position attempts.
pub const DEFAULT_POSITION_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Reads venue positions with a fixed delay between attempts.
#[derive(Debug, Clone, Copy)]
pub struct PositionReader {
    retry_delay: Duration,
}

impl Default for PositionReader {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION_RETRY_DELAY)
    }
}

impl PositionReader {
    /// Create a reader waiting `retry_delay` between attempts.
    #[must_use]
    pub const fn new(retry_delay: Duration) -> Self {
        Self { retry_delay }
    }

    /// Read the position in `symbol`, making `retries + 1` attempts.
    pub async fn read(&self, venue: &dyn VenuePort, symbol: &Symbol, retries: u32) -> PositionLookup {
        let policy = RetryPolicy::fixed(retries.saturating_add(1), self.retry_delay);

        match retry_with(&policy, "read_position", |_| venue.get_position(symbol), |_| true).await {
            Ok(snapshot) => PositionLookup::Found(snapshot),
            Err(error) => {
                let attempts = error.attempts();
                let last = error.into_inner();
                let reason = if last.is_not_found() {
                    AbsenceReason::NotFound
                } else {
                    AbsenceReason::LookupFailed
                };
                tracing::info!(
                    symbol = %symbol,
                    exchange = %venue.exchange(),
                    attempts,
                    reason = ?reason,
                    error = %last,
                    "Position not available"
                );
                record_position_absent(
                    venue.exchange().as_str(),
                    match reason {
                        AbsenceReason::NotFound => "not_found",
                        AbsenceReason::LookupFailed => "lookup_failed",
                    },
                );
                PositionLookup::Absent {
                    symbol: symbol.clone(),
                    reason,
                }
            }
        }
    }
}
