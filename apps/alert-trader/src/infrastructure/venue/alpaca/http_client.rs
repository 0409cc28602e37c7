//! HTTP client for the Alpaca trading and data APIs.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::AlpacaErrorResponse;
use super::config::AlpacaConfig;
use super::error::AlpacaError;
use crate::application::retry::RetryPolicy;
use crate::infrastructure::venue::transport::{TransportError, send_with_retry};

const VENUE: &str = "alpaca";

/// Authenticated Alpaca HTTP client.
#[derive(Debug, Clone)]
pub struct AlpacaHttpClient {
    client: Client,
    api_key: String,
    api_secret: String,
    trading_base_url: String,
    data_base_url: String,
    retry: RetryPolicy,
}

impl AlpacaHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(AlpacaError::AuthenticationFailed);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AlpacaError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            trading_base_url: config.trading_base_url.clone(),
            data_base_url: config.data_base_url.clone(),
            retry: config.retry.clone(),
        })
    }

    /// GET from the trading API.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AlpacaError> {
        let url = format!("{}{path}", self.trading_base_url);
        let body = send_with_retry(&self.retry, VENUE, || {
            Ok(self.authed(self.client.get(&url)).query(query))
        })
        .await
        .map_err(|e| map_transport(e, path))?;
        parse(&body)
    }

    /// GET from the market data API.
    pub async fn data_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AlpacaError> {
        let url = format!("{}{path}", self.data_base_url);
        let body = send_with_retry(&self.retry, VENUE, || {
            Ok(self.authed(self.client.get(&url)).query(query))
        })
        .await
        .map_err(|e| map_transport(e, path))?;
        parse(&body)
    }

    /// POST a JSON body to the trading API.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, AlpacaError> {
        let url = format!("{}{path}", self.trading_base_url);
        let body = send_with_retry(&self.retry, VENUE, || {
            Ok(self.authed(self.client.post(&url)).json(payload))
        })
        .await
        .map_err(|e| map_transport(e, path))?;
        parse(&body)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret)
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, AlpacaError> {
    serde_json::from_str(body).map_err(|e| AlpacaError::JsonParse(e.to_string()))
}

fn map_transport(error: TransportError, path: &str) -> AlpacaError {
    match error {
        TransportError::Network(msg) => AlpacaError::Network(msg),
        TransportError::MaxRetriesExceeded { attempts, last } => {
            tracing::warn!(path, attempts, last = %last, "Alpaca retries exhausted");
            AlpacaError::MaxRetriesExceeded { attempts }
        }
        TransportError::Status { status, body } => {
            let message = serde_json::from_str::<AlpacaErrorResponse>(&body)
                .map_or(body, |r| r.message);
            let is_order = path.starts_with("/v2/orders");
            match status {
                StatusCode::UNAUTHORIZED => AlpacaError::AuthenticationFailed,
                // Insufficient buying power arrives as 403 on order endpoints.
                StatusCode::FORBIDDEN if is_order => AlpacaError::OrderRejected(message),
                StatusCode::FORBIDDEN => AlpacaError::AuthenticationFailed,
                StatusCode::NOT_FOUND => AlpacaError::NotFound {
                    resource: path.to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY => AlpacaError::OrderRejected(message),
                StatusCode::TOO_MANY_REQUESTS => AlpacaError::RateLimited,
                other => AlpacaError::Api {
                    code: other.as_u16().to_string(),
                    message,
                },
            }
        }
    }
}
