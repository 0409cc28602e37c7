//! In-memory tax ledger and take-profit queue.

use std::collections::VecDeque;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::application::ports::{
    LedgerError, RealizedTrade, TakeProfitItem, TakeProfitQueuePort, TaxLedgerPort,
};
use crate::domain::tax::FinancialYearStart;

fn poisoned<T>(_: T) -> LedgerError {
    LedgerError::Storage {
        message: "in-memory store lock poisoned".to_string(),
    }
}

/// In-memory implementation of `TaxLedgerPort`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug)]
pub struct InMemoryTaxLedger {
    year_start: FinancialYearStart,
    trades: RwLock<Vec<RealizedTrade>>,
}

impl InMemoryTaxLedger {
    /// Create an empty ledger whose financial years begin at `year_start`.
    #[must_use]
    pub const fn new(year_start: FinancialYearStart) -> Self {
        Self {
            year_start,
            trades: RwLock::new(Vec::new()),
        }
    }

    /// All recorded trades, oldest first.
    pub fn trades(&self) -> Result<Vec<RealizedTrade>, LedgerError> {
        Ok(self.trades.read().map_err(poisoned)?.clone())
    }
}

impl Default for InMemoryTaxLedger {
    fn default() -> Self {
        Self::new(FinancialYearStart::default())
    }
}

#[async_trait]
impl TaxLedgerPort for InMemoryTaxLedger {
    async fn outstanding_tax(&self, as_of: DateTime<Utc>) -> Result<Decimal, LedgerError> {
        let since = self.year_start.year_containing(as_of);
        let trades = self.trades.read().map_err(poisoned)?;
        Ok(trades
            .iter()
            .filter(|t| t.realized_at >= since)
            .map(|t| t.tax_reserved)
            .sum())
    }

    async fn record_realized_trade(&self, trade: RealizedTrade) -> Result<(), LedgerError> {
        self.trades.write().map_err(poisoned)?.push(trade);
        Ok(())
    }
}

/// In-memory FIFO implementation of `TakeProfitQueuePort`.
#[derive(Debug, Default)]
pub struct InMemoryTakeProfitQueue {
    items: RwLock<VecDeque<TakeProfitItem>>,
}

impl InMemoryTakeProfitQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TakeProfitQueuePort for InMemoryTakeProfitQueue {
    async fn enqueue(&self, item: TakeProfitItem) -> Result<(), LedgerError> {
        self.items.write().map_err(poisoned)?.push_back(item);
        Ok(())
    }

    async fn pop_next(&self) -> Result<Option<TakeProfitItem>, LedgerError> {
        Ok(self.items.write().map_err(poisoned)?.pop_front())
    }

    async fn remaining(&self) -> Result<usize, LedgerError> {
        Ok(self.items.read().map_err(poisoned)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts::AccountName;
    use crate::domain::shared::{Exchange, Symbol};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn trade(tax: Decimal, at: DateTime<Utc>) -> RealizedTrade {
        RealizedTrade {
            exchange: Exchange::Alpaca,
            symbol: Symbol::new("TQQQ"),
            profit_or_loss: tax * dec!(5),
            tax_reserved: tax,
            realized_at: at,
        }
    }

    #[tokio::test]
    async fn outstanding_tax_only_counts_current_financial_year() {
        let ledger = InMemoryTaxLedger::default();
        let last_year = Utc.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap();
        let this_year = Utc.with_ymd_and_hms(2024, 4, 6, 12, 0, 0).unwrap();
        ledger.record_realized_trade(trade(dec!(30), last_year)).await.unwrap();
        ledger.record_realized_trade(trade(dec!(10), this_year)).await.unwrap();
        ledger.record_realized_trade(trade(dec!(2.5), this_year)).await.unwrap();

        let as_of = Utc.with_ymd_and_hms(2024, 6, 17, 15, 0, 0).unwrap();
        assert_eq!(ledger.outstanding_tax(as_of).await.unwrap(), dec!(12.5));
        assert_eq!(ledger.trades().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_ledger_owes_nothing() {
        let ledger = InMemoryTaxLedger::default();
        assert_eq!(ledger.outstanding_tax(Utc::now()).await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn queue_is_fifo() {
        let queue = InMemoryTakeProfitQueue::new();
        for symbol in ["AAPL", "MSFT"] {
            queue
                .enqueue(TakeProfitItem {
                    exchange: Exchange::Alpaca,
                    account: AccountName::Live,
                    symbol: Symbol::new(symbol),
                    entry_price: dec!(100),
                    take_profit_pct: dec!(0.05),
                    queued_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        assert_eq!(queue.remaining().await.unwrap(), 2);
        let first = queue.pop_next().await.unwrap().unwrap();
        assert_eq!(first.symbol, Symbol::new("AAPL"));
        assert_eq!(queue.remaining().await.unwrap(), 1);
        queue.pop_next().await.unwrap();
        assert!(queue.pop_next().await.unwrap().is_none());
    }
}
