//! Domain Layer
//!
//! Pure business logic for alert-driven trading. Nothing in here performs I/O;
//! venue reads and writes live behind the application ports.

pub mod accounts;
pub mod market;
pub mod market_clock;
pub mod pairs;
pub mod profit_loss;
pub mod scheduling;
pub mod shared;
pub mod sizing;
pub mod tax;
