//! Quotes and bars.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-of-book snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quote {
    /// Best ask price.
    pub ask_price: Decimal,
    /// Best bid price.
    pub bid_price: Decimal,
    /// Size at the ask.
    pub ask_size: Decimal,
    /// Size at the bid.
    pub bid_size: Decimal,
}

impl Quote {
    /// Create a quote.
    #[must_use]
    pub const fn new(
        ask_price: Decimal,
        bid_price: Decimal,
        ask_size: Decimal,
        bid_size: Decimal,
    ) -> Self {
        Self {
            ask_price,
            bid_price,
            ask_size,
            bid_size,
        }
    }

    /// Quote derived from a bar: ask at the high, bid at the low, no size.
    #[must_use]
    pub const fn from_bar(bar: &Bar) -> Self {
        Self {
            ask_price: bar.high,
            bid_price: bar.low,
            ask_size: Decimal::ZERO,
            bid_size: Decimal::ZERO,
        }
    }

    /// A quote with both sides at zero carries no price information.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ask_price.is_zero() && self.bid_price.is_zero()
    }

    /// Price used for share sizing: the bid when present, otherwise the ask.
    #[must_use]
    pub fn sizing_price(&self) -> Decimal {
        if self.bid_price.is_zero() {
            self.ask_price
        } else {
            self.bid_price
        }
    }
}

/// High and low of the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bar {
    /// Bar high.
    pub high: Decimal,
    /// Bar low.
    pub low: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sizing_price_prefers_bid() {
        let quote = Quote::new(dec!(101), dec!(100), dec!(5), dec!(7));
        assert_eq!(quote.sizing_price(), dec!(100));

        let no_bid = Quote::new(dec!(101), Decimal::ZERO, dec!(5), Decimal::ZERO);
        assert_eq!(no_bid.sizing_price(), dec!(101));
    }

    #[test]
    fn bar_quote_has_no_size() {
        let quote = Quote::from_bar(&Bar {
            high: dec!(12.5),
            low: dec!(11.75),
        });
        assert_eq!(quote.ask_price, dec!(12.5));
        assert_eq!(quote.bid_price, dec!(11.75));
        assert!(quote.ask_size.is_zero());
        assert!(!quote.is_empty());
    }
}
