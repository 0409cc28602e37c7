//! Venue Port (Driven Port)
//!
//! Interface for reading account state and submitting orders on a venue.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::accounts::AccountCredentials;
use crate::domain::market::{
    AccountBalance, Bar, HistoricalOrder, OrderConfirmation, OrderRequest, PositionSnapshot,
    Quote, SymbolIncrement,
};
use crate::domain::shared::{Exchange, Symbol};

/// Venue port error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VenueError {
    /// Connection error.
    #[error("Venue connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// The requested resource does not exist (no position, unknown symbol).
    #[error("Not found: {resource}")]
    NotFound {
        /// What was looked up.
        resource: String,
    },

    /// Order rejected by the venue.
    #[error("Order rejected: {reason}")]
    OrderRejected {
        /// Rejection reason.
        reason: String,
    },

    /// Credentials refused.
    #[error("Venue authentication failed")]
    AuthenticationFailed,

    /// Rate limited.
    #[error("Rate limited by venue")]
    RateLimited,

    /// Unknown error.
    #[error("Venue error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

impl VenueError {
    /// Whether the venue reported the resource as absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Port for one authenticated venue account.
#[async_trait]
pub trait VenuePort: Send + Sync {
    /// Venue this client talks to.
    fn exchange(&self) -> Exchange;

    /// Equity and cash relevant to trading `symbol`.
    ///
    /// Single-asset venues report the free balance of the symbol's quote
    /// asset as both equity and cash.
    async fn get_account_balance(&self, symbol: &Symbol) -> Result<AccountBalance, VenueError>;

    /// Position in `symbol`; [`VenueError::NotFound`] when none is held.
    async fn get_position(&self, symbol: &Symbol) -> Result<PositionSnapshot, VenueError>;

    /// Latest top-of-book quote.
    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<Quote, VenueError>;

    /// Latest bar.
    async fn get_latest_bar(&self, symbol: &Symbol) -> Result<Bar, VenueError>;

    /// Minimum base and quote increments.
    async fn get_symbol_increment(&self, symbol: &Symbol) -> Result<SymbolIncrement, VenueError>;

    /// Whether notional orders are accepted for `symbol`.
    async fn is_fractionable(&self, symbol: &Symbol) -> Result<bool, VenueError>;

    /// Submit an order.
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderConfirmation, VenueError>;

    /// Most recent closed orders for `symbol`, newest first.
    async fn get_recent_closed_orders(
        &self,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<Vec<HistoricalOrder>, VenueError>;
}

/// Builds venue clients for resolved credentials.
pub trait VenueFactory: Send + Sync {
    /// Create a client for `exchange` authenticated with `credentials`.
    fn connect(
        &self,
        exchange: Exchange,
        credentials: &AccountCredentials,
    ) -> Result<Arc<dyn VenuePort>, VenueError>;
}
