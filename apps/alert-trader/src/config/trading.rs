//! Tax and trading knobs.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::tax::FinancialYearStart;

/// `tax:` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Rate applied to realized gains, in `[0, 1]`.
    #[serde(default = "default_tax_rate")]
    pub rate: Decimal,
    /// First day of the financial year.
    #[serde(default)]
    pub financial_year_start: FinancialYearStart,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            rate: default_tax_rate(),
            financial_year_start: FinancialYearStart::default(),
        }
    }
}

/// `trading:` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Capital share deployed when an alert carries none.
    #[serde(default = "default_capital_percentage")]
    pub default_capital_percentage: Decimal,
    /// Allow limit entries in the Alpaca premarket window.
    #[serde(default = "default_true")]
    pub premarket_trading: bool,
    /// Retries after the first position read.
    #[serde(default = "default_position_retries")]
    pub position_retries: u32,
    /// Wait between position reads, in seconds.
    #[serde(default = "default_position_retry_delay_secs")]
    pub position_retry_delay_secs: u64,
    /// Closed orders fetched for P/L matching.
    #[serde(default = "default_recent_order_limit")]
    pub recent_order_limit: usize,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            default_capital_percentage: default_capital_percentage(),
            premarket_trading: true,
            position_retries: default_position_retries(),
            position_retry_delay_secs: default_position_retry_delay_secs(),
            recent_order_limit: default_recent_order_limit(),
        }
    }
}

impl TradingConfig {
    /// Wait between position reads.
    #[must_use]
    pub const fn position_retry_delay(&self) -> Duration {
        Duration::from_secs(self.position_retry_delay_secs)
    }
}

fn default_tax_rate() -> Decimal {
    dec!(0.2)
}

fn default_capital_percentage() -> Decimal {
    dec!(0.97)
}

pub(crate) const fn default_true() -> bool {
    true
}

const fn default_position_retries() -> u32 {
    2
}

const fn default_position_retry_delay_secs() -> u64 {
    5
}

const fn default_recent_order_limit() -> usize {
    50
}
