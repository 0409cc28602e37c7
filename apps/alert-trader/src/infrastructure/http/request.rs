//! HTTP request DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::accounts::AccountName;
use crate::domain::market::TradingViewAlert;

/// Webhook body: the TradingView alert plus optional routing options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    /// Alert fields.
    #[serde(flatten)]
    pub alert: TradingViewAlert,
    /// Account to trade; defaults to live.
    #[serde(default)]
    pub account: Option<AccountName>,
    /// Share of capital to deploy, as a fraction.
    #[serde(default)]
    pub capital_percentage: Option<Decimal>,
    /// Keep realized tax invested.
    #[serde(default)]
    pub reinvest_tax: bool,
    /// Schedule a recheck at the next interval; defaults to true.
    #[serde(default)]
    pub schedule_recheck: Option<bool>,
}
