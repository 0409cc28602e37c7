//! Alpaca Markets Venue Adapter
//!
//! Implementation of `VenuePort` for the Alpaca trading and market data APIs:
//! - Equity and crypto quotes, bars and asset metadata
//! - Notional, share and extended-hours limit orders
//! - Closed order history for P/L matching
//! - Retry logic with exponential backoff

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;

pub use adapter::AlpacaVenueAdapter;
pub use config::{AlpacaConfig, AlpacaEnvironment};
pub use error::AlpacaError;
