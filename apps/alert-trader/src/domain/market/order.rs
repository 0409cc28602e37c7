//! Order requests, confirmations and fill history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{OrderSide, OrderType, Symbol, TimeInForce};
use crate::error::TradingError;

/// Size of an order: units or quote-currency value, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum OrderAmount {
    /// Base units or whole shares.
    Quantity(Decimal),
    /// Quote-currency value.
    Notional(Decimal),
}

impl OrderAmount {
    /// The raw amount regardless of unit.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        match self {
            Self::Quantity(v) | Self::Notional(v) => *v,
        }
    }
}

/// Request to submit an order to a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Client order ID.
    pub client_order_id: String,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Quantity or notional.
    pub amount: OrderAmount,
    /// Order type.
    pub order_type: OrderType,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Limit price (for limit orders).
    pub limit_price: Option<Decimal>,
    /// Extended hours trading.
    pub extended_hours: bool,
}

impl OrderRequest {
    /// Create a market order request.
    #[must_use]
    pub fn market(symbol: Symbol, side: OrderSide, amount: OrderAmount) -> Self {
        Self {
            client_order_id: new_client_order_id(),
            symbol,
            side,
            amount,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::Day,
            limit_price: None,
            extended_hours: false,
        }
    }

    /// Create a limit order request for a unit quantity.
    #[must_use]
    pub fn limit(symbol: Symbol, side: OrderSide, quantity: Decimal, limit_price: Decimal) -> Self {
        Self {
            client_order_id: new_client_order_id(),
            symbol,
            side,
            amount: OrderAmount::Quantity(quantity),
            order_type: OrderType::Limit,
            time_in_force: TimeInForce::Day,
            limit_price: Some(limit_price),
            extended_hours: false,
        }
    }

    /// Set time in force.
    #[must_use]
    pub const fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    /// Enable extended hours.
    #[must_use]
    pub const fn with_extended_hours(mut self) -> Self {
        self.extended_hours = true;
        self
    }

    /// Reject requests a venue would refuse outright.
    pub fn validate(&self) -> Result<(), TradingError> {
        if self.amount.value() <= Decimal::ZERO {
            return Err(TradingError::VenuePrecisionRejectable {
                computed: self.amount.value(),
                minimum: Decimal::ZERO,
            });
        }
        match (self.order_type, self.limit_price) {
            (OrderType::Limit, None) => Err(TradingError::InvalidOrder(
                "limit order without a limit price".to_string(),
            )),
            (OrderType::Limit, Some(_)) if matches!(self.amount, OrderAmount::Notional(_)) => Err(
                TradingError::InvalidOrder("limit orders must be sized in units".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

fn new_client_order_id() -> String {
    format!("at-{}", uuid::Uuid::new_v4().simple())
}

/// Acknowledgment from a venue after order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Venue-assigned order ID.
    pub venue_order_id: String,
    /// Client order ID echoed back.
    pub client_order_id: String,
    /// Venue status string.
    pub status: String,
    /// Filled quantity so far.
    pub filled_qty: Decimal,
    /// Average fill price, when any quantity has filled.
    pub filled_avg_price: Option<Decimal>,
}

/// A closed order from venue history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalOrder {
    /// Order side.
    pub side: OrderSide,
    /// Filled quantity.
    pub filled_qty: Decimal,
    /// Total quote value of the fills.
    pub filled_notional: Decimal,
    /// When the order finished filling.
    pub filled_at: DateTime<Utc>,
}

impl HistoricalOrder {
    /// Create a historical order from its filled notional.
    #[must_use]
    pub const fn new(
        side: OrderSide,
        filled_qty: Decimal,
        filled_notional: Decimal,
        filled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            side,
            filled_qty,
            filled_notional,
            filled_at,
        }
    }

    /// Create a historical order from an average fill price.
    #[must_use]
    pub fn at_price(
        side: OrderSide,
        filled_qty: Decimal,
        price: Decimal,
        filled_at: DateTime<Utc>,
    ) -> Self {
        Self::new(side, filled_qty, filled_qty * price, filled_at)
    }

    /// Whether any quantity filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled_qty > Decimal::ZERO
    }

    /// Notional per unit; zero for an unfilled order.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        if self.filled_qty.is_zero() {
            Decimal::ZERO
        } else {
            self.filled_notional / self.filled_qty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn market_order_defaults() {
        let request = OrderRequest::market(
            Symbol::new("TQQQ"),
            OrderSide::Buy,
            OrderAmount::Notional(dec!(250)),
        );
        assert_eq!(request.order_type, OrderType::Market);
        assert_eq!(request.time_in_force, TimeInForce::Day);
        assert!(request.limit_price.is_none());
        assert!(request.client_order_id.starts_with("at-"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn limit_order_with_extended_hours() {
        let request = OrderRequest::limit(Symbol::new("SQQQ"), OrderSide::Buy, dec!(9), dec!(10.5))
            .with_extended_hours()
            .with_time_in_force(TimeInForce::Gtc);
        assert!(request.extended_hours);
        assert_eq!(request.limit_price, Some(dec!(10.5)));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn zero_amount_is_rejectable() {
        let request = OrderRequest::market(
            Symbol::new("TQQQ"),
            OrderSide::Sell,
            OrderAmount::Quantity(Decimal::ZERO),
        );
        assert!(matches!(
            request.validate(),
            Err(TradingError::VenuePrecisionRejectable { .. })
        ));
    }

    #[test]
    fn unit_price_of_filled_order() {
        let order = HistoricalOrder::new(OrderSide::Sell, dec!(10), dec!(1000), Utc::now());
        assert_eq!(order.unit_price(), dec!(100));
        assert!(order.is_filled());
    }
}
