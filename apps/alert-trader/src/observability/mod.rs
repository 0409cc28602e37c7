//! Observability module for metrics.
//!
//! Tracing subscriber setup lives in [`crate::telemetry`]; this module owns
//! the Prometheus exporter and the counters the workflows record.

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_order_submission, record_position_absent,
    record_realized_trade, record_recheck, record_webhook_request,
};
