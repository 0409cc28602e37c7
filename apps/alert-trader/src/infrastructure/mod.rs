//! Infrastructure Layer
//!
//! Adapters behind the application ports: venue REST clients, the callback
//! dispatcher, persistence for the tax ledger and take-profit queue, and the
//! inbound HTTP surface.

pub mod dispatcher;
pub mod http;
pub mod persistence;
pub mod venue;
