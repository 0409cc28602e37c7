//! HTTP response DTOs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::use_cases::TakeProfitOrder;
use crate::error::TradingError;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Take-profit endpoint response.
#[derive(Debug, Clone, Serialize)]
pub struct TakeProfitResponse {
    /// Order placed, or `None` when the queue was empty.
    pub order: Option<TakeProfitOrder>,
}

/// A [`TradingError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub TradingError);

impl From<TradingError> for ApiError {
    fn from(err: TradingError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code for the wrapped error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match &self.0 {
            TradingError::Unauthorized => StatusCode::UNAUTHORIZED,
            TradingError::InvalidAlert(_) => StatusCode::BAD_REQUEST,
            TradingError::UnknownPair { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            tracing::warn!(code = self.0.code(), error = %self.0, "Request rejected");
        } else {
            tracing::error!(code = self.0.code(), error = %self.0, "Request failed");
        }
        let body = ErrorResponse {
            code: self.0.code().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
