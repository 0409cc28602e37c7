//! Error types for order sizing.

use rust_decimal::Decimal;
use std::fmt;

/// Error during order sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizingError {
    /// Invalid input (zero price, non-positive step, etc.).
    InvalidInput(String),
    /// Nothing to deploy after applying the capital percentage.
    InsufficientFunds {
        /// Funds the percentage produced.
        requested: Decimal,
        /// Cash reported by the venue.
        available: Decimal,
    },
    /// The balance does not exceed the requested slice.
    InsufficientBalance {
        /// Asset balance.
        balance: Decimal,
        /// Requested percentage or fixed amount.
        requested: Decimal,
    },
    /// The computed amount floors to nothing at the venue's increment.
    BelowIncrement {
        /// Amount before flooring.
        computed: Decimal,
        /// Smallest tradable step.
        minimum: Decimal,
    },
}

impl fmt::Display for SizingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::InsufficientFunds {
                requested,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: requested {requested}, available {available}"
                )
            }
            Self::InsufficientBalance { balance, requested } => {
                write!(
                    f,
                    "Balance {balance} does not exceed requested allocation {requested}"
                )
            }
            Self::BelowIncrement { computed, minimum } => {
                write!(f, "Computed amount {computed} is below increment {minimum}")
            }
        }
    }
}

impl std::error::Error for SizingError {}
