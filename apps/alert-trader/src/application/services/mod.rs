//! Application Services
//!
//! Reusable reads and writes the use cases compose: quote resolution with a
//! bar fallback, retried position reads, tax-aware balances and dispatcher
//! scheduling.

mod balance_reader;
mod position_reader;
mod quote_resolver;
mod scheduler;

pub use balance_reader::BalanceReader;
pub use position_reader::PositionReader;
pub use quote_resolver::{QUOTE_ATTEMPTS, QuoteResolver};
pub use scheduler::Scheduler;
