//! Balance Reader
//!
//! Account balance net of tax already reserved in the current financial year.

use chrono::{DateTime, Utc};

use crate::application::ports::{TaxLedgerPort, VenuePort};
use crate::domain::market::AccountBalance;
use crate::domain::shared::Symbol;
use crate::error::TradingError;

/// Reads balances and subtracts outstanding tax.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceReader;

impl BalanceReader {
    /// Balance available for trading `symbol`.
    ///
    /// When `reinvest_tax` is set the ledger is not consulted.
    pub async fn read<L: TaxLedgerPort + ?Sized>(
        &self,
        venue: &dyn VenuePort,
        ledger: &L,
        symbol: &Symbol,
        reinvest_tax: bool,
        now: DateTime<Utc>,
    ) -> Result<AccountBalance, TradingError> {
        let balance = venue.get_account_balance(symbol).await?;
        if reinvest_tax {
            return Ok(balance);
        }

        let outstanding = ledger.outstanding_tax(now).await?;
        let available = balance.less_reserved(outstanding);
        tracing::debug!(
            symbol = %symbol,
            equity = %balance.equity,
            cash = %balance.cash,
            outstanding_tax = %outstanding,
            "Balance net of reserved tax"
        );
        Ok(available)
    }
}
