//! Core types for order sizing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::market::{OrderAmount, Quote};

/// Inputs for the percentage-of-equity path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquitySizingInput {
    /// Account equity after any tax reservation.
    pub equity: Decimal,
    /// Cash available for new positions.
    pub cash: Decimal,
    /// Share of equity to deploy, in `(0, 1]`.
    pub capital_percentage: Decimal,
    /// Whether the venue accepts notional orders for the asset.
    pub fractionable: bool,
    /// Current quote, used only for non-fractionable assets.
    pub quote: Quote,
}

/// Result of the equity path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SizingDecision {
    /// Dollar amount for a fractionable asset.
    Notional(Decimal),
    /// Whole-share count for a non-fractionable asset.
    Shares(Decimal),
}

impl SizingDecision {
    /// The order amount this decision submits.
    #[must_use]
    pub const fn amount(&self) -> OrderAmount {
        match self {
            Self::Notional(v) => OrderAmount::Notional(*v),
            Self::Shares(v) => OrderAmount::Quantity(*v),
        }
    }
}

/// How much of a single-asset balance to deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum BalanceAllocation {
    /// Fraction of the balance, in `(0, 1]`.
    Percentage(Decimal),
    /// Fixed amount in the balance's asset.
    FixedAmount(Decimal),
}

impl BalanceAllocation {
    /// The raw requested value used by the headroom check.
    #[must_use]
    pub const fn requested(&self) -> Decimal {
        match self {
            Self::Percentage(v) | Self::FixedAmount(v) => *v,
        }
    }
}
