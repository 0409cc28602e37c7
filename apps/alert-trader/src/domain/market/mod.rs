//! Market Data and Order Value Objects
//!
//! Venue-neutral shapes for quotes, positions, balances, increments, orders
//! and inbound alerts.

mod alert;
mod increment;
mod order;
mod position;
mod quote;

pub use alert::{MAX_ALERT_PRICE, TradingViewAlert, ValidatedAlert};
pub(crate) use alert::constant_time_eq;
pub use increment::SymbolIncrement;
pub use order::{HistoricalOrder, OrderAmount, OrderConfirmation, OrderRequest};
pub use position::{AbsenceReason, AccountBalance, PositionLookup, PositionSnapshot};
pub use quote::{Bar, Quote};
