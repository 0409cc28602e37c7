//! Pair book: which instruments a signal opens and closes.
//!
//! A pair is a long instrument with an optional inverse (TQQQ/SQQQ). A buy
//! signal targets the long leg and closes the inverse; a sell signal targets
//! the inverse and closes the long leg. Long-only pairs simply exit on a sell.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Exchange, OrderSide, Symbol};

/// One configured pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    /// Venue trading the pair.
    pub exchange: Exchange,
    /// Instrument bought on a buy signal.
    pub long_symbol: Symbol,
    /// Instrument bought on a sell signal, if any.
    #[serde(default)]
    pub inverse_symbol: Option<Symbol>,
    /// Queue a take-profit limit at this fractional gain after opening.
    #[serde(default)]
    pub take_profit_pct: Option<Decimal>,
    /// Instrument bought with reserved tax after a realized gain.
    #[serde(default)]
    pub tax_reserve_symbol: Option<Symbol>,
}

/// Legs touched by one signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairLegs {
    /// Position to close first.
    pub close: Option<Symbol>,
    /// Position to open afterwards.
    pub target: Option<Symbol>,
}

impl PairConfig {
    /// Whether `symbol` is either leg of this pair.
    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        &self.long_symbol == symbol || self.inverse_symbol.as_ref() == Some(symbol)
    }

    /// Close and target legs for a signal direction.
    #[must_use]
    pub fn legs(&self, side: OrderSide) -> PairLegs {
        match side {
            OrderSide::Buy => PairLegs {
                close: self.inverse_symbol.clone(),
                target: Some(self.long_symbol.clone()),
            },
            OrderSide::Sell => PairLegs {
                close: Some(self.long_symbol.clone()),
                target: self.inverse_symbol.clone(),
            },
        }
    }
}

/// All configured pairs.
#[derive(Debug, Clone, Default)]
pub struct PairBook {
    pairs: Vec<PairConfig>,
}

impl PairBook {
    /// Create a book.
    #[must_use]
    pub const fn new(pairs: Vec<PairConfig>) -> Self {
        Self { pairs }
    }

    /// Pair on `exchange` with `symbol` as one of its legs.
    #[must_use]
    pub fn find(&self, exchange: Exchange, symbol: &Symbol) -> Option<&PairConfig> {
        self.pairs
            .iter()
            .find(|pair| pair.exchange == exchange && pair.contains(symbol))
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pairs are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tqqq() -> PairConfig {
        PairConfig {
            exchange: Exchange::Alpaca,
            long_symbol: Symbol::new("TQQQ"),
            inverse_symbol: Some(Symbol::new("SQQQ")),
            take_profit_pct: None,
            tax_reserve_symbol: None,
        }
    }

    #[test]
    fn buy_targets_long_and_closes_inverse() {
        let legs = tqqq().legs(OrderSide::Buy);
        assert_eq!(legs.target, Some(Symbol::new("TQQQ")));
        assert_eq!(legs.close, Some(Symbol::new("SQQQ")));
    }

    #[test]
    fn sell_on_long_only_pair_just_exits() {
        let pair = PairConfig {
            inverse_symbol: None,
            ..tqqq()
        };
        let legs = pair.legs(OrderSide::Sell);
        assert_eq!(legs.close, Some(Symbol::new("TQQQ")));
        assert!(legs.target.is_none());
    }

    #[test]
    fn find_matches_either_leg_on_the_right_venue() {
        let book = PairBook::new(vec![tqqq()]);
        assert!(book.find(Exchange::Alpaca, &Symbol::new("sqqq")).is_some());
        assert!(book.find(Exchange::Binance, &Symbol::new("TQQQ")).is_none());
        assert!(book.find(Exchange::Alpaca, &Symbol::new("SPY")).is_none());
    }
}
