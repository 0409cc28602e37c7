//! Scheduler
//!
//! Turns recheck instants and next-session opens into dispatcher requests.
//! Callbacks are addressed relative to the service's public base URL; without
//! one nothing can be scheduled and the caller gets
//! [`TradingError::SchedulerMisconfigured`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::ports::{CronRequest, DispatchRequest, DispatcherPort};
use crate::domain::scheduling::{CronExpression, ScheduledCheck, delay_until};
use crate::error::TradingError;

/// Callback path for dispatched rechecks.
pub const RECHECK_PATH: &str = "/recheck";

/// Callback path for the take-profit queue.
pub const TAKE_PROFIT_PATH: &str = "/take-profit/next";

/// Schedules callbacks through a dispatcher.
pub struct Scheduler<D>
where
    D: DispatcherPort,
{
    dispatcher: Arc<D>,
    callback_base_url: Option<String>,
}

impl<D> Scheduler<D>
where
    D: DispatcherPort,
{
    /// Create a scheduler posting callbacks under `callback_base_url`.
    pub fn new(dispatcher: Arc<D>, callback_base_url: Option<String>) -> Self {
        Self {
            dispatcher,
            callback_base_url: callback_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
        }
    }

    fn callback(&self, path: &str) -> Result<String, TradingError> {
        self.callback_base_url
            .as_deref()
            .map(|base| format!("{base}{path}"))
            .ok_or_else(|| {
                TradingError::SchedulerMisconfigured("callback base URL is not set".to_string())
            })
    }

    /// Deliver `check` to the recheck endpoint at its dispatch instant.
    pub async fn schedule_recheck(
        &self,
        check: &ScheduledCheck,
        now: DateTime<Utc>,
    ) -> Result<u64, TradingError> {
        let url = self.callback(RECHECK_PATH)?;
        let delay_seconds = delay_until(check.dispatch_at_utc, now)?;
        let payload = serde_json::to_value(check)
            .map_err(|e| TradingError::SchedulerMisconfigured(e.to_string()))?;

        self.dispatcher
            .dispatch(DispatchRequest {
                url,
                delay_seconds,
                payload,
            })
            .await?;

        tracing::info!(
            symbol = %check.target_symbol,
            exchange = %check.exchange,
            dispatch_at = %check.dispatch_at_utc,
            delay_seconds,
            "Recheck scheduled"
        );
        Ok(delay_seconds)
    }

    /// Call the take-profit endpoint once at `instant`.
    pub async fn schedule_take_profit(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<CronExpression, TradingError> {
        let url = self.callback(TAKE_PROFIT_PATH)?;
        self.schedule_next_session(url, instant).await
    }

    /// Create a one-shot cron calling `url` at `instant`.
    pub async fn schedule_next_session(
        &self,
        url: String,
        instant: DateTime<Utc>,
    ) -> Result<CronExpression, TradingError> {
        let cron = CronExpression::one_shot(instant);
        self.dispatcher
            .schedule_cron(CronRequest {
                url,
                cron: cron.clone(),
            })
            .await?;

        tracing::info!(cron = %cron, at = %instant, "Cron scheduled");
        Ok(cron)
    }
}
