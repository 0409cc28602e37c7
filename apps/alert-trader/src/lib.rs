// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::items_after_statements,
        clippy::option_if_let_else
    )
)]

//! Alert Trader - Rust Core Library
//!
//! Turns TradingView webhook alerts into venue orders on Alpaca and Binance.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure business rules, no I/O
//!   - `accounts`: Account table and credential selection
//!   - `market`: Alerts, quotes, positions, orders and venue increments
//!   - `pairs`: Long/inverse pair legs opened and closed per signal
//!   - `market_clock`: Session windows and next evaluation instants
//!   - `sizing`: Equity and balance based order sizing
//!   - `profit_loss`: Realized P/L of the latest disposal
//!   - `scheduling`: Deferred checks and one-shot cron expressions
//!   - `tax`: Tax due on realized gains and financial-year boundaries
//!
//! - **Application**: Ports, services and use cases
//!   - `ports`: `VenuePort`, `TaxLedgerPort`, `DispatcherPort`, `TakeProfitQueuePort`
//!   - `services`: Quote resolution, position and balance reads, scheduling
//!   - `use_cases`: `SubmitPairTrade`, `TakeProfit`, `Recheck`
//!
//! - **Infrastructure**: Adapters
//!   - `venue`: Alpaca and Binance REST clients
//!   - `dispatcher`: Delayed message and cron scheduling over HTTP
//!   - `persistence`: In-memory and SQLite ledgers
//!   - `http`: Axum webhook surface
//!
//! - **Configuration**: YAML with `${VAR}` interpolation, see [`config`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Error types shared across layers.
pub mod error;

/// Prometheus metrics.
pub mod observability;

/// OpenTelemetry tracing setup.
pub mod telemetry;

pub use application::use_cases::{
    PairTradeCommand, PairTradeOutcome, RecheckOutcome, RecheckUseCase, SubmitPairTradeUseCase,
    TakeProfitUseCase,
};
pub use domain::accounts::{AccountCredentials, AccountName, AccountTable, CredentialSelector};
pub use domain::shared::{Exchange, OrderSide, OrderType, Symbol, TimeInForce};
pub use error::TradingError;
