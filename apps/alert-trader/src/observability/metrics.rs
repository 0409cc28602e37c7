//! Prometheus metrics for the alert trader.
//!
//! # Example
//!
//! ```ignore
//! use alert_trader::observability::{init_metrics, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default())?;
//! record_order_submission("alpaca", "TQQQ", "buy", "market");
//! ```

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for webhook latency (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // Venue round trips dominate; 10ms to 30s
            latency_buckets: vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Order Metrics
// ============================================================================

/// Record an order accepted by a venue.
///
/// # Arguments
///
/// * `exchange` - Venue name (e.g., "alpaca", "binance")
/// * `symbol` - Symbol traded
/// * `side` - "buy" or "sell"
/// * `order_type` - "market" or "limit"
pub fn record_order_submission(exchange: &str, symbol: &str, side: &str, order_type: &str) {
    counter!(
        "orders_submitted_total",
        "exchange" => exchange.to_string(),
        "symbol" => symbol.to_string(),
        "side" => side.to_string(),
        "order_type" => order_type.to_string()
    )
    .increment(1);
}

/// Record a realized disposal.
///
/// `outcome` is "gain" or "loss"; `taxed` says whether tax was reserved.
pub fn record_realized_trade(exchange: &str, outcome: &str, taxed: bool) {
    counter!(
        "realized_trades_total",
        "exchange" => exchange.to_string(),
        "outcome" => outcome.to_string(),
        "taxed" => taxed.to_string()
    )
    .increment(1);
}

// ============================================================================
// Position Metrics
// ============================================================================

/// Record a position read that exhausted its retries.
pub fn record_position_absent(exchange: &str, reason: &str) {
    counter!(
        "position_absent_total",
        "exchange" => exchange.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a recheck result ("in_sync" or "diverged").
pub fn record_recheck(exchange: &str, outcome: &str) {
    counter!(
        "recheck_total",
        "exchange" => exchange.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record an inbound request.
///
/// # Arguments
///
/// * `route` - Route name (e.g., "webhook", "recheck")
/// * `status` - HTTP status code
/// * `latency_seconds` - Handler duration in seconds
pub fn record_webhook_request(route: &str, status: u16, latency_seconds: f64) {
    counter!(
        "http_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!("http_request_duration_seconds", "route" => route.to_string())
        .record(latency_seconds);
}
