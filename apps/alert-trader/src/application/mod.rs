//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for venues, ledgers, queues and the dispatcher
//! - **Retry**: The single retry policy shared by services
//! - **Services**: Quote resolution, position and balance reads, scheduling
//! - **Use Cases**: Pair trades, take-profit orders and rechecks

pub mod ports;
pub mod retry;
pub mod services;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

pub use ports::*;
pub use use_cases::*;
