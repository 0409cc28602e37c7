//! Persistence Adapters
//!
//! Tax ledger and take-profit queue storage: in-memory for tests and
//! single-process development, SQLite for anything that must survive a
//! restart.

pub mod in_memory;
pub mod sqlite;

pub use in_memory::{InMemoryTakeProfitQueue, InMemoryTaxLedger};
pub use sqlite::SqliteStore;
