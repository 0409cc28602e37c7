//! Order sizing.
//!
//! Two paths turn available capital into an order amount:
//! - equity path: a share of account equity, clamped to cash, sent as a
//!   notional when the asset is fractionable and as whole shares otherwise
//! - balance path: a share (or fixed amount) of a single asset balance,
//!   floored to the venue increment
//!
//! # Example
//!
//! ```rust,ignore
//! use alert_trader::domain::sizing::{size_by_equity, EquitySizingInput, SizingDecision};
//! use rust_decimal_macros::dec;
//!
//! let decision = size_by_equity(&EquitySizingInput {
//!     equity: dec!(1000),
//!     cash: dec!(5000),
//!     capital_percentage: dec!(0.97),
//!     fractionable: false,
//!     quote: Quote::new(dec!(98), dec!(97), dec!(1), dec!(1)),
//! })?;
//! assert_eq!(decision, SizingDecision::Shares(dec!(9)));
//! ```

mod error;
mod sizer;
mod types;

pub use error::SizingError;
pub use sizer::{NON_FRACTIONABLE_HAIRCUT, floor_to_step, size_by_balance, size_by_equity};
pub use types::{BalanceAllocation, EquitySizingInput, SizingDecision};
