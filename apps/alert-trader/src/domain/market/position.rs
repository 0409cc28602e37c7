//! Positions and account balances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;
use crate::error::TradingError;

/// Venue-side holding for one symbol.
///
/// `found == false` means the holding is unknown, which is not the same as a
/// zero quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Symbol held.
    pub symbol: Symbol,
    /// Quantity held (base units or shares).
    pub quantity_held: Decimal,
    /// Market value in the quote currency.
    pub market_value: Decimal,
    /// Whether the venue reported the position.
    pub found: bool,
}

impl PositionSnapshot {
    /// A reported position.
    #[must_use]
    pub const fn new(symbol: Symbol, quantity_held: Decimal, market_value: Decimal) -> Self {
        Self {
            symbol,
            quantity_held,
            market_value,
            found: true,
        }
    }

    /// Placeholder for a position that could not be read.
    #[must_use]
    pub const fn unknown(symbol: Symbol) -> Self {
        Self {
            symbol,
            quantity_held: Decimal::ZERO,
            market_value: Decimal::ZERO,
            found: false,
        }
    }
}

/// Why a position lookup came back empty-handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceReason {
    /// The venue reported that no such position exists.
    NotFound,
    /// Every attempt failed with another error.
    LookupFailed,
}

/// Outcome of a retried position read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionLookup {
    /// The venue reported a position.
    Found(PositionSnapshot),
    /// Retries were exhausted without a position.
    Absent {
        /// Symbol looked up.
        symbol: Symbol,
        /// Classification of the last failure.
        reason: AbsenceReason,
    },
}

impl PositionLookup {
    /// Snapshot view; absence becomes `found == false`.
    #[must_use]
    pub fn snapshot(self) -> PositionSnapshot {
        match self {
            Self::Found(snapshot) => snapshot,
            Self::Absent { symbol, .. } => PositionSnapshot::unknown(symbol),
        }
    }

    /// Definitive view for callers that cannot proceed without a position.
    pub fn require(self) -> Result<PositionSnapshot, TradingError> {
        match self {
            Self::Found(snapshot) => Ok(snapshot),
            Self::Absent { symbol, .. } => Err(TradingError::PositionUnknown {
                symbol: symbol.to_string(),
            }),
        }
    }

    /// Quantity held when a non-empty position was found.
    #[must_use]
    pub fn held_quantity(&self) -> Option<Decimal> {
        match self {
            Self::Found(snapshot) if snapshot.quantity_held > Decimal::ZERO => {
                Some(snapshot.quantity_held)
            }
            _ => None,
        }
    }
}

/// Equity and cash available to a sizing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Total account equity.
    pub equity: Decimal,
    /// Cash available for new positions.
    pub cash: Decimal,
}

impl AccountBalance {
    /// Create a balance.
    #[must_use]
    pub const fn new(equity: Decimal, cash: Decimal) -> Self {
        Self { equity, cash }
    }

    /// Both figures reduced by an amount set aside, floored at zero.
    #[must_use]
    pub fn less_reserved(self, reserved: Decimal) -> Self {
        Self {
            equity: (self.equity - reserved).max(Decimal::ZERO),
            cash: (self.cash - reserved).max(Decimal::ZERO),
        }
    }
}
