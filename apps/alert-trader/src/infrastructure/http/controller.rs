//! HTTP Controller (Driver Adapter)
//!
//! Axum routes delegating to the application use cases. The webhook is
//! authenticated by the alert's own token; dispatcher callbacks by an
//! optional bearer token.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::application::ports::{DispatcherPort, TakeProfitQueuePort, TaxLedgerPort, VenueFactory};
use crate::application::use_cases::{
    PairTradeCommand, RecheckUseCase, SubmitPairTradeUseCase, TakeProfitUseCase,
};
use crate::domain::market::constant_time_eq;
use crate::domain::scheduling::ScheduledCheck;
use crate::domain::shared::Exchange;
use crate::error::TradingError;
use crate::observability::record_webhook_request;

use super::request::WebhookRequest;
use super::response::{ApiError, HealthResponse, TakeProfitResponse};

/// Application state shared across handlers.
pub struct AppState<F, L, Q, D>
where
    F: VenueFactory,
    L: TaxLedgerPort,
    Q: TakeProfitQueuePort,
    D: DispatcherPort,
{
    /// Pair trade workflow.
    pub pair_trade: Arc<SubmitPairTradeUseCase<F, L, Q, D>>,
    /// Take-profit queue workflow.
    pub take_profit: Arc<TakeProfitUseCase<F, Q, D>>,
    /// Recheck workflow.
    pub recheck: Arc<RecheckUseCase<F>>,
    /// Token every alert must carry.
    pub webhook_token: Arc<str>,
    /// Bearer token required on dispatcher callbacks, when set.
    pub callback_token: Option<Arc<str>>,
    /// Application version.
    pub version: String,
}

impl<F, L, Q, D> Clone for AppState<F, L, Q, D>
where
    F: VenueFactory,
    L: TaxLedgerPort,
    Q: TakeProfitQueuePort,
    D: DispatcherPort,
{
    fn clone(&self) -> Self {
        Self {
            pair_trade: Arc::clone(&self.pair_trade),
            take_profit: Arc::clone(&self.take_profit),
            recheck: Arc::clone(&self.recheck),
            webhook_token: Arc::clone(&self.webhook_token),
            callback_token: self.callback_token.clone(),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<F, L, Q, D>(state: AppState<F, L, Q, D>) -> Router
where
    F: VenueFactory + 'static,
    L: TaxLedgerPort + 'static,
    Q: TakeProfitQueuePort + 'static,
    D: DispatcherPort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/webhook/{exchange}", post(webhook))
        .route("/recheck", post(recheck))
        .route("/take-profit/next", post(take_profit_next))
        .with_state(state)
}

fn respond<T: Serialize>(route: &str, started: Instant, result: Result<T, TradingError>) -> Response {
    let response = match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => ApiError(err).into_response(),
    };
    record_webhook_request(
        route,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

fn authorize_callback(expected: Option<&str>, headers: &HeaderMap) -> Result<(), TradingError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(TradingError::Unauthorized)
    }
}

/// Health check endpoint.
async fn health_check<F, L, Q, D>(State(state): State<AppState<F, L, Q, D>>) -> impl IntoResponse
where
    F: VenueFactory,
    L: TaxLedgerPort,
    Q: TakeProfitQueuePort,
    D: DispatcherPort,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// TradingView webhook endpoint.
async fn webhook<F, L, Q, D>(
    State(state): State<AppState<F, L, Q, D>>,
    Path(exchange): Path<String>,
    Json(request): Json<WebhookRequest>,
) -> Response
where
    F: VenueFactory,
    L: TaxLedgerPort,
    Q: TakeProfitQueuePort,
    D: DispatcherPort,
{
    let started = Instant::now();
    let result = async {
        let alert = request.alert.validate(&state.webhook_token)?;
        let exchange: Exchange = exchange
            .parse()
            .map_err(|e: crate::domain::shared::UnknownExchange| {
                TradingError::InvalidAlert(e.to_string())
            })?;

        let mut command = PairTradeCommand::from_alert(exchange, alert);
        command.account = request.account;
        command.capital_percentage = request.capital_percentage;
        command.reinvest_tax = request.reinvest_tax;
        command.schedule_recheck = request.schedule_recheck.unwrap_or(true);

        state.pair_trade.execute(command).await
    }
    .await;
    respond("/webhook", started, result)
}

/// Dispatcher callback for scheduled rechecks.
async fn recheck<F, L, Q, D>(
    State(state): State<AppState<F, L, Q, D>>,
    headers: HeaderMap,
    Json(check): Json<ScheduledCheck>,
) -> Response
where
    F: VenueFactory,
    L: TaxLedgerPort,
    Q: TakeProfitQueuePort,
    D: DispatcherPort,
{
    let started = Instant::now();
    let result = match authorize_callback(state.callback_token.as_deref(), &headers) {
        Ok(()) => state.recheck.execute(&check).await,
        Err(e) => Err(e),
    };
    respond("/recheck", started, result)
}

/// Dispatcher callback draining one take-profit item.
async fn take_profit_next<F, L, Q, D>(
    State(state): State<AppState<F, L, Q, D>>,
    headers: HeaderMap,
) -> Response
where
    F: VenueFactory,
    L: TaxLedgerPort,
    Q: TakeProfitQueuePort,
    D: DispatcherPort,
{
    let started = Instant::now();
    let result = match authorize_callback(state.callback_token.as_deref(), &headers) {
        Ok(()) => state
            .take_profit
            .execute_next()
            .await
            .map(|order| TakeProfitResponse { order }),
        Err(e) => Err(e),
    };
    respond("/take-profit/next", started, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn callbacks_open_without_token() {
        assert!(authorize_callback(None, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn callbacks_require_matching_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer s3cret"));
        assert!(authorize_callback(Some("s3cret"), &headers).is_ok());
        assert!(matches!(
            authorize_callback(Some("other"), &headers),
            Err(TradingError::Unauthorized)
        ));
        assert!(authorize_callback(Some("s3cret"), &HeaderMap::new()).is_err());
    }
}
