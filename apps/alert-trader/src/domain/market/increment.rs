//! Venue minimum increments.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::OrderSide;

/// Minimum tradable step sizes for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolIncrement {
    /// Smallest quantity step of the base asset.
    pub base_asset_precision: Decimal,
    /// Smallest amount step of the quote asset.
    pub quote_asset_precision: Decimal,
}

impl SymbolIncrement {
    /// Create an increment pair.
    #[must_use]
    pub const fn new(base_asset_precision: Decimal, quote_asset_precision: Decimal) -> Self {
        Self {
            base_asset_precision,
            quote_asset_precision,
        }
    }

    /// Buys are sized in the quote asset, sells in the base asset.
    #[must_use]
    pub const fn step_for(&self, side: OrderSide) -> Decimal {
        match side {
            OrderSide::Buy => self.quote_asset_precision,
            OrderSide::Sell => self.base_asset_precision,
        }
    }
}
