//! Alpaca wire types.
//!
//! The trading API encodes decimals as strings; the data API uses JSON
//! numbers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order submission body.
#[derive(Debug, Clone, Serialize)]
pub struct AlpacaOrderRequest {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notional: Option<String>,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub time_in_force: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
    pub client_order_id: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub extended_hours: bool,
}

/// Order as returned by submit and list calls.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaOrder {
    pub id: String,
    pub client_order_id: String,
    pub status: String,
    pub side: String,
    #[serde(default)]
    pub filled_qty: Option<String>,
    #[serde(default)]
    pub filled_avg_price: Option<String>,
    #[serde(default)]
    pub filled_at: Option<DateTime<Utc>>,
}

/// `GET /v2/account`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaAccount {
    pub equity: String,
    pub cash: String,
}

/// `GET /v2/positions/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaPosition {
    pub symbol: String,
    pub qty: String,
    #[serde(default)]
    pub market_value: Option<String>,
}

/// `GET /v2/assets/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaAsset {
    pub fractionable: bool,
    #[serde(default)]
    pub min_trade_increment: Option<String>,
    #[serde(default)]
    pub price_increment: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaErrorResponse {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    pub message: String,
}

/// Quote fields shared by the stock and crypto endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AlpacaQuote {
    #[serde(default)]
    pub ap: f64,
    #[serde(default)]
    pub bp: f64,
    #[serde(default, rename = "as")]
    pub ask_size: f64,
    #[serde(default)]
    pub bs: f64,
}

/// Bar fields shared by the stock and crypto endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AlpacaBar {
    #[serde(default)]
    pub h: f64,
    #[serde(default)]
    pub l: f64,
}

/// `GET /v2/stocks/{symbol}/quotes/latest`.
#[derive(Debug, Clone, Deserialize)]
pub struct StockLatestQuote {
    #[serde(default)]
    pub quote: AlpacaQuote,
}

/// `GET /v2/stocks/{symbol}/bars/latest`.
#[derive(Debug, Clone, Deserialize)]
pub struct StockLatestBar {
    #[serde(default)]
    pub bar: AlpacaBar,
}

/// `GET /v1beta3/crypto/us/latest/quotes`.
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoLatestQuotes {
    #[serde(default)]
    pub quotes: HashMap<String, AlpacaQuote>,
}

/// `GET /v1beta3/crypto/us/latest/bars`.
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoLatestBars {
    #[serde(default)]
    pub bars: HashMap<String, AlpacaBar>,
}
