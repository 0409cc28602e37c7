//! Dispatcher used when no scheduling service is configured.

use async_trait::async_trait;

use crate::application::ports::{CronRequest, DispatchError, DispatchRequest, DispatcherPort};

/// Refuses every request with [`DispatchError::Misconfigured`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredDispatcher;

#[async_trait]
impl DispatcherPort for UnconfiguredDispatcher {
    async fn dispatch(&self, request: DispatchRequest) -> Result<(), DispatchError> {
        tracing::warn!(url = %request.url, "Dropping delayed callback: no dispatcher configured");
        Err(DispatchError::Misconfigured(
            "no dispatcher token configured".to_string(),
        ))
    }

    async fn schedule_cron(&self, request: CronRequest) -> Result<(), DispatchError> {
        tracing::warn!(url = %request.url, cron = %request.cron, "Dropping cron: no dispatcher configured");
        Err(DispatchError::Misconfigured(
            "no dispatcher token configured".to_string(),
        ))
    }
}
