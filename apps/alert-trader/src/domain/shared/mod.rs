//! Shared Kernel
//!
//! Value objects used by every other domain module.

pub mod value_objects;

pub use value_objects::{Exchange, OrderSide, OrderType, Symbol, TimeInForce, UnknownExchange};
