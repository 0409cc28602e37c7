//! Error handling for the alert trader.
//!
//! Every failure a workflow can surface is a [`TradingError`]. Component
//! errors (sizing, P/L matching, venue, dispatcher, ledger) convert into it
//! so use cases can propagate with `?` and abort the remaining steps.
//!
//! # Client vs server failures
//!
//! | Kind | Class |
//! |------|-------|
//! | `Unauthorized`, `InvalidAlert`, `UnknownPair` | client (4xx) |
//! | everything else | server (5xx) |

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::application::ports::{DispatchError, LedgerError, VenueError};
use crate::domain::accounts::AccountName;
use crate::domain::profit_loss::ProfitLossError;
use crate::domain::shared::{Exchange, Symbol};
use crate::domain::sizing::SizingError;

/// Errors surfaced by trading workflows.
#[derive(Debug, Error)]
pub enum TradingError {
    /// No credentials configured for the resolved account.
    #[error("No credentials configured for {exchange} account '{account}'")]
    CredentialsNotFound {
        /// Venue requested.
        exchange: Exchange,
        /// Account resolved after development-mode override.
        account: AccountName,
    },

    /// Sizing produced nothing to deploy, or the balance lacks headroom.
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Amount requested.
        requested: Decimal,
        /// Amount available.
        available: Decimal,
    },

    /// Order history does not cover the sold quantity.
    #[error("Insufficient matching buy history: sold {sold}, matched {matched}")]
    InsufficientMatchingHistory {
        /// Quantity sold.
        sold: Decimal,
        /// Buy quantity found.
        matched: Decimal,
    },

    /// History does not start with a sell, so nothing was disposed of.
    #[error("No recent disposal to measure")]
    NoRecentDisposal,

    /// Neither quotes nor bars produced a price.
    #[error("Quote unavailable for {symbol} after {attempts} attempts")]
    QuoteUnavailable {
        /// Symbol quoted.
        symbol: String,
        /// Attempts made.
        attempts: u32,
    },

    /// A definitive position was required but could not be read.
    #[error("Position unknown for {symbol}")]
    PositionUnknown {
        /// Symbol looked up.
        symbol: String,
    },

    /// The order amount is below the venue's minimum increment.
    #[error("Computed amount {computed} is below the venue minimum {minimum}")]
    VenuePrecisionRejectable {
        /// Amount computed.
        computed: Decimal,
        /// Minimum increment.
        minimum: Decimal,
    },

    /// Dispatcher configuration is missing.
    #[error("Scheduler misconfigured: {0}")]
    SchedulerMisconfigured(String),

    /// A follow-up was computed for an instant already passed.
    #[error("Refusing to schedule at {target}, which is before {now}")]
    SchedulingInThePast {
        /// Instant computed.
        target: DateTime<Utc>,
        /// Current instant.
        now: DateTime<Utc>,
    },

    /// The alert's ticker is not part of a configured pair.
    #[error("No pair configured for {symbol} on {exchange}")]
    UnknownPair {
        /// Venue.
        exchange: Exchange,
        /// Alert ticker.
        symbol: Symbol,
    },

    /// Webhook payload failed validation.
    #[error("Invalid alert: {0}")]
    InvalidAlert(String),

    /// Webhook token mismatch.
    #[error("Unauthorized")]
    Unauthorized,

    /// Order request is malformed.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Venue call failed.
    #[error(transparent)]
    Venue(#[from] VenueError),

    /// Dispatcher rejected or failed a delivery.
    #[error(transparent)]
    Dispatch(DispatchError),

    /// Ledger or queue storage failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] LedgerError),
}

impl TradingError {
    /// Whether the caller sent something wrong, as opposed to a core failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::InvalidAlert(_) | Self::UnknownPair { .. }
        )
    }

    /// Stable machine-readable code for responses and metric labels.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CredentialsNotFound { .. } => "CREDENTIALS_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InsufficientMatchingHistory { .. } => "INSUFFICIENT_MATCHING_HISTORY",
            Self::NoRecentDisposal => "NO_RECENT_DISPOSAL",
            Self::QuoteUnavailable { .. } => "QUOTE_UNAVAILABLE",
            Self::PositionUnknown { .. } => "POSITION_UNKNOWN",
            Self::VenuePrecisionRejectable { .. } => "VENUE_PRECISION_REJECTABLE",
            Self::SchedulerMisconfigured(_) => "SCHEDULER_MISCONFIGURED",
            Self::SchedulingInThePast { .. } => "SCHEDULING_IN_THE_PAST",
            Self::UnknownPair { .. } => "UNKNOWN_PAIR",
            Self::InvalidAlert(_) => "INVALID_ALERT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidOrder(_) => "INVALID_ORDER",
            Self::Venue(_) => "VENUE_ERROR",
            Self::Dispatch(_) => "DISPATCH_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl From<SizingError> for TradingError {
    fn from(err: SizingError) -> Self {
        match err {
            SizingError::InsufficientFunds {
                requested,
                available,
            } => Self::InsufficientFunds {
                requested,
                available,
            },
            SizingError::InsufficientBalance { balance, requested } => Self::InsufficientFunds {
                requested,
                available: balance,
            },
            SizingError::BelowIncrement { computed, minimum } => {
                Self::VenuePrecisionRejectable { computed, minimum }
            }
            SizingError::InvalidInput(msg) => Self::InvalidOrder(msg),
        }
    }
}

impl From<ProfitLossError> for TradingError {
    fn from(err: ProfitLossError) -> Self {
        match err {
            ProfitLossError::NoRecentDisposal => Self::NoRecentDisposal,
            ProfitLossError::InsufficientMatchingHistory { sold, matched } => {
                Self::InsufficientMatchingHistory { sold, matched }
            }
        }
    }
}

impl From<DispatchError> for TradingError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Misconfigured(msg) => Self::SchedulerMisconfigured(msg),
            other => Self::Dispatch(other),
        }
    }
}
