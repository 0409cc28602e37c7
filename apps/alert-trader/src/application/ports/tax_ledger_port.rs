//! Tax Ledger Port (Driven Port)
//!
//! Persistence for realized trades and the tax reserved against them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Exchange, Symbol};

/// Storage error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    /// Backend unreachable or query failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Error details.
        message: String,
    },

    /// Stored data could not be decoded.
    #[error("Corrupt record: {message}")]
    Corrupt {
        /// Error details.
        message: String,
    },
}

/// A realized round trip and the tax set aside for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizedTrade {
    /// Venue.
    pub exchange: Exchange,
    /// Symbol disposed of.
    pub symbol: Symbol,
    /// Signed realized result.
    pub profit_or_loss: Decimal,
    /// Tax reserved; zero for losses or skipped reservations.
    pub tax_reserved: Decimal,
    /// When the disposal was recorded.
    pub realized_at: DateTime<Utc>,
}

/// Port for the tax ledger.
#[async_trait]
pub trait TaxLedgerPort: Send + Sync {
    /// Tax reserved but not yet paid for the financial year containing `as_of`.
    async fn outstanding_tax(&self, as_of: DateTime<Utc>) -> Result<Decimal, LedgerError>;

    /// Persist a realized trade.
    async fn record_realized_trade(&self, trade: RealizedTrade) -> Result<(), LedgerError>;
}
