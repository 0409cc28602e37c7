//! Shared value objects.

mod exchange;
mod order_terms;
mod symbol;

pub use exchange::{Exchange, UnknownExchange};
pub use order_terms::{OrderSide, OrderType, TimeInForce};
pub use symbol::Symbol;
