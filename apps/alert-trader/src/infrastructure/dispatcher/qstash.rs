//! QStash dispatcher.
//!
//! Delayed callbacks go through `POST /v2/publish/{url}` with an
//! `Upstash-Delay` header; one-shot crons through `POST /v2/schedules/{url}`
//! with `Upstash-Cron`. QStash retries delivery itself, so callbacks arrive
//! at least once.

use async_trait::async_trait;
use reqwest::Client;

use crate::application::ports::{CronRequest, DispatchError, DispatchRequest, DispatcherPort};
use crate::application::retry::RetryPolicy;
use crate::infrastructure::venue::transport::{TransportError, send_with_retry};

/// Default QStash API base URL.
pub const DEFAULT_QSTASH_URL: &str = "https://qstash.upstash.io";

/// QStash connection settings.
#[derive(Debug, Clone)]
pub struct QstashConfig {
    /// API base URL.
    pub base_url: String,
    /// Bearer token.
    pub token: String,
    /// Bearer token QStash forwards to the callback endpoints.
    pub callback_token: Option<String>,
    /// Retry policy for publish calls.
    pub retry: RetryPolicy,
}

impl QstashConfig {
    /// Settings for `token` against the public endpoint.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_QSTASH_URL.to_string(),
            token: token.into(),
            callback_token: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Forward `Authorization: Bearer {token}` with every callback.
    #[must_use]
    pub fn with_callback_token(mut self, token: Option<String>) -> Self {
        self.callback_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// `DispatcherPort` backed by QStash.
#[derive(Debug, Clone)]
pub struct QstashDispatcher {
    client: Client,
    config: QstashConfig,
}

impl QstashDispatcher {
    /// Create a dispatcher; an empty token or base URL is a configuration error.
    pub fn new(config: QstashConfig) -> Result<Self, DispatchError> {
        if config.token.trim().is_empty() {
            return Err(DispatchError::Misconfigured(
                "dispatcher token is empty".to_string(),
            ));
        }
        if config.base_url.trim().is_empty() {
            return Err(DispatchError::Misconfigured(
                "dispatcher base URL is empty".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            config,
        })
    }

    async fn post(
        &self,
        endpoint: &str,
        destination: &str,
        header: (&'static str, String),
        body: Option<&serde_json::Value>,
    ) -> Result<(), DispatchError> {
        let url = format!("{}{endpoint}/{destination}", self.config.base_url);
        send_with_retry(&self.config.retry, "qstash", || {
            let mut request = self
                .client
                .post(&url)
                .bearer_auth(&self.config.token)
                .header(header.0, &header.1);
            if let Some(token) = &self.config.callback_token {
                request = request.header("Upstash-Forward-Authorization", format!("Bearer {token}"));
            }
            if let Some(body) = body {
                request = request.json(body);
            }
            Ok(request)
        })
        .await
        .map(|_| ())
        .map_err(map_transport)
    }
}

fn map_transport(error: TransportError) -> DispatchError {
    match error {
        TransportError::Status { status, body } => DispatchError::Rejected {
            status: status.as_u16(),
            message: body,
        },
        other => DispatchError::Transport(other.to_string()),
    }
}

#[async_trait]
impl DispatcherPort for QstashDispatcher {
    async fn dispatch(&self, request: DispatchRequest) -> Result<(), DispatchError> {
        self.post(
            "/v2/publish",
            &request.url,
            ("Upstash-Delay", format!("{}s", request.delay_seconds)),
            Some(&request.payload),
        )
        .await?;
        tracing::debug!(url = %request.url, delay_seconds = request.delay_seconds, "Message published");
        Ok(())
    }

    async fn schedule_cron(&self, request: CronRequest) -> Result<(), DispatchError> {
        self.post(
            "/v2/schedules",
            &request.url,
            ("Upstash-Cron", request.cron.as_str().to_string()),
            None,
        )
        .await?;
        tracing::debug!(url = %request.url, cron = %request.cron, "Schedule created");
        Ok(())
    }
}
