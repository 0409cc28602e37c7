//! Venue adapters.

pub mod alpaca;
pub mod binance;
mod factory;
pub mod transport;

pub use factory::RestVenueFactory;
