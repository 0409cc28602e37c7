//! Realized profit/loss of the most recent disposal.
//!
//! Venue order history arrives newest first. The leading run of sells is the
//! disposal being measured; buys are then consumed newest to oldest until the
//! sold quantity is covered, taking only part of the last buy when needed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::market::HistoricalOrder;
use crate::domain::shared::OrderSide;

/// Realized result over the quantity of the latest disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitLoss {
    /// Quantity sold in the disposal.
    pub quantity: Decimal,
    /// Proceeds of the disposal.
    pub proceeds: Decimal,
    /// Cost of the matched buys.
    pub cost: Decimal,
}

impl ProfitLoss {
    /// Signed result: positive is a gain.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.proceeds - self.cost
    }

    /// Whether the disposal realized a gain.
    #[must_use]
    pub fn is_gain(&self) -> bool {
        self.amount() > Decimal::ZERO
    }
}

/// Why P/L could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfitLossError {
    /// The newest filled order is not a sell.
    #[error("Most recent fill is not a sell")]
    NoRecentDisposal,

    /// The history window does not contain enough buys.
    #[error("Insufficient matching buy history: sold {sold}, matched {matched}")]
    InsufficientMatchingHistory {
        /// Quantity sold.
        sold: Decimal,
        /// Buy quantity available in the window.
        matched: Decimal,
    },
}

/// Side of the most recent filled order, if any.
#[must_use]
pub fn most_recent_fill_side(orders_newest_first: &[HistoricalOrder]) -> Option<OrderSide> {
    orders_newest_first
        .iter()
        .find(|order| order.is_filled())
        .map(|order| order.side)
}

/// Match the latest run of sells against prior buys.
pub fn match_latest_disposal(
    orders_newest_first: &[HistoricalOrder],
) -> Result<ProfitLoss, ProfitLossError> {
    let mut filled = orders_newest_first.iter().filter(|o| o.is_filled());

    let mut sold = Decimal::ZERO;
    let mut proceeds = Decimal::ZERO;
    let mut remaining_history = Vec::new();
    for order in filled.by_ref() {
        if order.side == OrderSide::Sell {
            sold += order.filled_qty;
            proceeds += order.filled_notional;
        } else {
            remaining_history.push(order);
            break;
        }
    }

    if sold.is_zero() {
        return Err(ProfitLossError::NoRecentDisposal);
    }

    let mut matched = Decimal::ZERO;
    let mut cost = Decimal::ZERO;
    let buys = remaining_history
        .into_iter()
        .chain(filled)
        .filter(|o| o.side == OrderSide::Buy);

    for buy in buys {
        let needed = sold - matched;
        if needed <= Decimal::ZERO {
            break;
        }
        let take = buy.filled_qty.min(needed);
        cost += if take == buy.filled_qty {
            buy.filled_notional
        } else {
            take * buy.unit_price()
        };
        matched += take;
    }

    if matched < sold {
        return Err(ProfitLossError::InsufficientMatchingHistory { sold, matched });
    }

    Ok(ProfitLoss {
        quantity: sold,
        proceeds,
        cost,
    })
}
