//! SQLite tax ledger and take-profit queue.
//!
//! Decimals are stored as TEXT to keep them exact; instants as Unix
//! milliseconds.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};

use crate::application::ports::{
    LedgerError, RealizedTrade, TakeProfitItem, TakeProfitQueuePort, TaxLedgerPort,
};
use crate::domain::accounts::AccountName;
use crate::domain::shared::{Exchange, Symbol};
use crate::domain::tax::FinancialYearStart;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS realized_trades(
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        exchange TEXT NOT NULL,
        symbol TEXT NOT NULL,
        profit_or_loss TEXT NOT NULL,
        tax_reserved TEXT NOT NULL,
        realized_at_ms INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_realized_at ON realized_trades(realized_at_ms);

    CREATE TABLE IF NOT EXISTS take_profit_queue(
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        exchange TEXT NOT NULL,
        account TEXT NOT NULL,
        symbol TEXT NOT NULL,
        entry_price TEXT NOT NULL,
        take_profit_pct TEXT NOT NULL,
        queued_at_ms INTEGER NOT NULL
    );
";

fn storage(e: sqlx::Error) -> LedgerError {
    LedgerError::Storage {
        message: e.to_string(),
    }
}

fn corrupt(message: impl Into<String>) -> LedgerError {
    LedgerError::Corrupt {
        message: message.into(),
    }
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, LedgerError> {
    let raw: String = row.try_get(column).map_err(storage)?;
    Decimal::from_str(&raw).map_err(|_| corrupt(format!("{column}: {raw}")))
}

fn instant_column(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, LedgerError> {
    let millis: i64 = row.try_get(column).map_err(storage)?;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| corrupt(format!("{column}: {millis}")))
}

/// SQLite-backed `TaxLedgerPort` and `TakeProfitQueuePort`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    year_start: FinancialYearStart,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and apply the schema.
    ///
    /// `sqlite::memory:` gets a single connection so every query sees the
    /// same database.
    pub async fn connect(url: &str, year_start: FinancialYearStart) -> Result<Self, LedgerError> {
        let in_memory = url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(url)
            .map_err(storage)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(30));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await
            .map_err(storage)?;

        sqlx::query(SCHEMA).execute(&pool).await.map_err(storage)?;
        tracing::info!(url, "SQLite store ready");
        Ok(Self { pool, year_start })
    }
}

#[async_trait]
impl TaxLedgerPort for SqliteStore {
    async fn outstanding_tax(&self, as_of: DateTime<Utc>) -> Result<Decimal, LedgerError> {
        let since = self.year_start.year_containing(as_of).timestamp_millis();
        let rows = sqlx::query("SELECT tax_reserved FROM realized_trades WHERE realized_at_ms >= ?")
            .bind(since)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        rows.iter()
            .map(|row| decimal_column(row, "tax_reserved"))
            .sum()
    }

    async fn record_realized_trade(&self, trade: RealizedTrade) -> Result<(), LedgerError> {
        sqlx::query(
            "INSERT INTO realized_trades (exchange, symbol, profit_or_loss, tax_reserved, realized_at_ms)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(trade.exchange.as_str())
        .bind(trade.symbol.as_str())
        .bind(trade.profit_or_loss.to_string())
        .bind(trade.tax_reserved.to_string())
        .bind(trade.realized_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }
}

#[async_trait]
impl TakeProfitQueuePort for SqliteStore {
    async fn enqueue(&self, item: TakeProfitItem) -> Result<(), LedgerError> {
        sqlx::query(
            "INSERT INTO take_profit_queue (exchange, account, symbol, entry_price, take_profit_pct, queued_at_ms)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(item.exchange.as_str())
        .bind(item.account.as_str())
        .bind(item.symbol.as_str())
        .bind(item.entry_price.to_string())
        .bind(item.take_profit_pct.to_string())
        .bind(item.queued_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn pop_next(&self) -> Result<Option<TakeProfitItem>, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let Some(row) = sqlx::query("SELECT * FROM take_profit_queue ORDER BY id LIMIT 1")
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage)?
        else {
            return Ok(None);
        };

        let id: i64 = row.try_get("id").map_err(storage)?;
        let exchange: String = row.try_get("exchange").map_err(storage)?;
        let account: String = row.try_get("account").map_err(storage)?;
        let symbol: String = row.try_get("symbol").map_err(storage)?;
        let item = TakeProfitItem {
            exchange: Exchange::from_str(&exchange).map_err(|e| corrupt(e.to_string()))?,
            account: AccountName::from_str(&account).map_err(|e| corrupt(e.to_string()))?,
            symbol: Symbol::new(symbol),
            entry_price: decimal_column(&row, "entry_price")?,
            take_profit_pct: decimal_column(&row, "take_profit_pct")?,
            queued_at: instant_column(&row, "queued_at_ms")?,
        };

        sqlx::query("DELETE FROM take_profit_queue WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(Some(item))
    }

    async fn remaining(&self) -> Result<usize, LedgerError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM take_profit_queue")
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        usize::try_from(count).map_err(|_| corrupt(format!("queue length {count}")))
    }
}
