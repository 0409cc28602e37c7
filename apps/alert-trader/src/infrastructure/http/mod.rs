//! HTTP/REST API adapter.
//!
//! Inbound adapter for TradingView webhooks and dispatcher callbacks.

mod controller;
mod request;
mod response;

pub use controller::{AppState, create_router};
pub use request::*;
pub use response::*;
