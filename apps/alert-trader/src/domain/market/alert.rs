//! Inbound TradingView alert.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{OrderSide, Symbol};
use crate::error::TradingError;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Upper bound on an alert price; keeps notional arithmetic far from
/// `Decimal::MAX`.
pub const MAX_ALERT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Alert payload as posted by a TradingView webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingViewAlert {
    /// Shared secret configured in the alert message.
    #[serde(alias = "token")]
    pub authentication_token: String,
    /// Chart ticker.
    #[serde(alias = "ticker")]
    pub ticker_symbol: String,
    /// Close price when the alert fired, as a decimal string.
    #[serde(alias = "price")]
    pub close_price_at_alert: String,
    /// Chart interval ("240", "1D", or empty).
    #[serde(default, alias = "interval")]
    pub interval_minutes: String,
    /// Buy signal when true, sell signal otherwise.
    #[serde(alias = "isBuy")]
    pub is_buy_signal: bool,
}

/// Alert after token and field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAlert {
    /// Normalized ticker.
    pub symbol: Symbol,
    /// Price at alert time.
    pub price: Decimal,
    /// Chart interval in minutes, if the alert carried one.
    pub interval_minutes: Option<u32>,
    /// Signal direction.
    pub side: OrderSide,
}

impl TradingViewAlert {
    /// Check the token and parse the payload fields.
    pub fn validate(&self, expected_token: &str) -> Result<ValidatedAlert, TradingError> {
        if expected_token.is_empty()
            || !constant_time_eq(self.authentication_token.as_bytes(), expected_token.as_bytes())
        {
            return Err(TradingError::Unauthorized);
        }

        let symbol = Symbol::new(self.ticker_symbol.as_str());
        if symbol.is_empty() {
            return Err(TradingError::InvalidAlert("ticker is empty".to_string()));
        }

        let price = Decimal::from_str(self.close_price_at_alert.trim()).map_err(|e| {
            TradingError::InvalidAlert(format!(
                "close price '{}' is not a decimal: {e}",
                self.close_price_at_alert
            ))
        })?;
        if price <= Decimal::ZERO {
            return Err(TradingError::InvalidAlert(format!(
                "close price must be positive, got {price}"
            )));
        }
        if price > MAX_ALERT_PRICE {
            return Err(TradingError::InvalidAlert(format!(
                "close price {price} exceeds {MAX_ALERT_PRICE}"
            )));
        }

        Ok(ValidatedAlert {
            symbol,
            price,
            interval_minutes: parse_interval(&self.interval_minutes)?,
            side: OrderSide::from_buy_flag(self.is_buy_signal),
        })
    }
}

/// Parse a chart interval into minutes; days use the `D` suffix.
fn parse_interval(raw: &str) -> Result<Option<u32>, TradingError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let invalid = || TradingError::InvalidAlert(format!("unsupported interval '{raw}'"));
    let days_prefix = raw.strip_suffix('D').or_else(|| raw.strip_suffix('d'));
    let minutes = match days_prefix {
        Some("") => MINUTES_PER_DAY,
        Some(days) => days
            .parse::<u32>()
            .ok()
            .and_then(|d| d.checked_mul(MINUTES_PER_DAY))
            .ok_or_else(invalid)?,
        None => raw.parse::<u32>().map_err(|_| invalid())?,
    };

    if minutes == 0 {
        return Err(invalid());
    }
    Ok(Some(minutes))
}

/// Compare two byte strings without short-circuiting on the first mismatch.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
