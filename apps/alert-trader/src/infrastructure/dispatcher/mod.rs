//! Dispatcher adapters.

mod qstash;
mod unconfigured;

pub use qstash::{DEFAULT_QSTASH_URL, QstashConfig, QstashDispatcher};
pub use unconfigured::UnconfiguredDispatcher;
