//! Recheck Use Case
//!
//! Consumes a dispatched [`ScheduledCheck`] and reports whether the venue
//! position still matches the direction recorded at order time. Divergence is
//! reported, never acted on.

use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::VenueFactory;
use crate::application::services::PositionReader;
use crate::domain::accounts::{CredentialSelector, DevelopmentMode};
use crate::domain::market::{AbsenceReason, PositionLookup};
use crate::domain::scheduling::ScheduledCheck;
use crate::domain::shared::Symbol;
use crate::error::TradingError;
use crate::observability::record_recheck;

/// Result of a recheck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecheckOutcome {
    /// Position matches the recorded direction.
    InSync {
        /// Symbol checked.
        symbol: Symbol,
        /// Whether a position is held.
        holding: bool,
    },
    /// Position does not match.
    Diverged {
        /// Symbol checked.
        symbol: Symbol,
        /// Whether a position was expected.
        expected_holding: bool,
        /// Whether a position is held.
        holding: bool,
    },
}

/// Use case for dispatched position checks.
pub struct RecheckUseCase<F>
where
    F: VenueFactory,
{
    venues: Arc<F>,
    selector: Arc<CredentialSelector>,
    dev_mode: DevelopmentMode,
    positions: PositionReader,
    position_retries: u32,
}

impl<F> RecheckUseCase<F>
where
    F: VenueFactory,
{
    /// Create a new `RecheckUseCase`.
    pub fn new(venues: Arc<F>, selector: Arc<CredentialSelector>, dev_mode: DevelopmentMode) -> Self {
        Self {
            venues,
            selector,
            dev_mode,
            positions: PositionReader::default(),
            position_retries: 2,
        }
    }

    /// Replace the position reader and its retry count.
    #[must_use]
    pub const fn with_position_reader(mut self, positions: PositionReader, retries: u32) -> Self {
        self.positions = positions;
        self.position_retries = retries;
        self
    }

    /// Compare the current position with the scheduled expectation.
    ///
    /// A venue that reports no position counts as not holding; a lookup that
    /// kept failing is [`TradingError::PositionUnknown`].
    pub async fn execute(&self, check: &ScheduledCheck) -> Result<RecheckOutcome, TradingError> {
        let credentials = self
            .selector
            .select(check.exchange, Some(check.account), self.dev_mode)?;
        let venue = self.venues.connect(check.exchange, credentials)?;

        let lookup = self
            .positions
            .read(venue.as_ref(), &check.target_symbol, self.position_retries)
            .await;
        let holding = match &lookup {
            PositionLookup::Found(_) => lookup.held_quantity().is_some(),
            PositionLookup::Absent {
                reason: AbsenceReason::NotFound,
                ..
            } => false,
            PositionLookup::Absent { symbol, .. } => {
                return Err(TradingError::PositionUnknown {
                    symbol: symbol.to_string(),
                });
            }
        };

        let expected_holding = check.buy_side_at_schedule;
        let symbol = check.target_symbol.clone();
        if holding == expected_holding {
            record_recheck(check.exchange.as_str(), "in_sync");
            tracing::info!(symbol = %symbol, holding, "Recheck in sync");
            Ok(RecheckOutcome::InSync { symbol, holding })
        } else {
            record_recheck(check.exchange.as_str(), "diverged");
            tracing::warn!(
                symbol = %symbol,
                exchange = %check.exchange,
                expected_holding,
                holding,
                scheduled_for = %check.dispatch_at_utc,
                "Position diverged from signal"
            );
            Ok(RecheckOutcome::Diverged {
                symbol,
                expected_holding,
                holding,
            })
        }
    }
}
