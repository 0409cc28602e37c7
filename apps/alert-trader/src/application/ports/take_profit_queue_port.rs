//! Take-Profit Queue Port (Driven Port)
//!
//! FIFO of positions waiting for a take-profit limit order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::accounts::AccountName;
use crate::domain::shared::{Exchange, Symbol};

use super::tax_ledger_port::LedgerError;

/// A position awaiting its take-profit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeProfitItem {
    /// Venue.
    pub exchange: Exchange,
    /// Account holding the position.
    pub account: AccountName,
    /// Symbol held.
    pub symbol: Symbol,
    /// Entry price of the position.
    pub entry_price: Decimal,
    /// Target gain as a fraction (0.05 = 5%).
    pub take_profit_pct: Decimal,
    /// When the item was queued.
    pub queued_at: DateTime<Utc>,
}

/// Port for the take-profit queue.
#[async_trait]
pub trait TakeProfitQueuePort: Send + Sync {
    /// Append an item.
    async fn enqueue(&self, item: TakeProfitItem) -> Result<(), LedgerError>;

    /// Remove and return the oldest item.
    async fn pop_next(&self) -> Result<Option<TakeProfitItem>, LedgerError>;

    /// Number of items still queued.
    async fn remaining(&self) -> Result<usize, LedgerError>;
}
