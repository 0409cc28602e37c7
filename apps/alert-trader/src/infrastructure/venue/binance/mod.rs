//! Binance Spot Venue Adapter
//!
//! Implementation of `VenuePort` for the Binance spot REST API. Account,
//! order and history endpoints are HMAC-SHA256 signed; balances stand in for
//! positions since spot accounts hold assets rather than positions.

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;

pub use adapter::BinanceVenueAdapter;
pub use config::{BinanceConfig, BinanceEnvironment};
pub use error::BinanceError;
