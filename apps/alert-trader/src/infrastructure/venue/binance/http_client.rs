//! HTTP client for the Binance spot API with HMAC-SHA256 request signing.

use hmac::{Hmac, Mac};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use sha2::Sha256;

use super::api_types::BinanceErrorResponse;
use super::config::BinanceConfig;
use super::error::BinanceError;
use crate::application::retry::RetryPolicy;
use crate::infrastructure::venue::transport::{TransportError, send_with_retry};

type HmacSha256 = Hmac<Sha256>;

const VENUE: &str = "binance";

/// Order rejection codes returned with HTTP 400 on `/api/v3/order`.
const REJECTION_CODES: [i64; 5] = [-1013, -1111, -2010, -2011, -1100];
/// Invalid key or signature.
const AUTH_CODES: [i64; 3] = [-1022, -2014, -2015];

/// Binance HTTP client.
#[derive(Debug, Clone)]
pub struct BinanceHttpClient {
    client: Client,
    api_key: String,
    secret_key: String,
    base_url: String,
    recv_window_ms: u64,
    retry: RetryPolicy,
}

impl BinanceHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &BinanceConfig) -> Result<Self, BinanceError> {
        if config.api_key.is_empty() || config.secret_key.is_empty() {
            return Err(BinanceError::AuthenticationFailed);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BinanceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            base_url: config.base_url.clone(),
            recv_window_ms: config.recv_window_ms,
            retry: config.retry.clone(),
        })
    }

    /// Unsigned GET for market data endpoints.
    pub async fn public_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, BinanceError> {
        let url = format!("{}{path}?{}", self.base_url, encode(params));
        let body = send_with_retry(&self.retry, VENUE, || Ok(self.client.get(&url)))
            .await
            .map_err(|e| map_transport(e, path))?;
        parse(&body)
    }

    /// Signed request; the timestamp and signature are refreshed per attempt.
    pub async fn signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, BinanceError> {
        let base = encode(params);
        let body = send_with_retry(&self.retry, VENUE, || {
            let query = self.signed_query(&base, chrono::Utc::now().timestamp_millis());
            let url = format!("{}{path}?{query}", self.base_url);
            Ok(self
                .client
                .request(method.clone(), url)
                .header("X-MBX-APIKEY", &self.api_key))
        })
        .await
        .map_err(|e| map_transport(e, path))?;
        parse(&body)
    }

    fn signed_query(&self, base: &str, timestamp_ms: i64) -> String {
        let prefix = if base.is_empty() {
            String::new()
        } else {
            format!("{base}&")
        };
        let params = format!(
            "{prefix}recvWindow={}&timestamp={timestamp_ms}",
            self.recv_window_ms
        );
        let signature = sign(&self.secret_key, &params);
        format!("{params}&signature={signature}")
    }
}

/// Hex-encoded HMAC-SHA256 of `query` under `secret`.
pub fn sign(secret: &str, query: &str) -> String {
    // HMAC accepts keys of any length, so construction cannot fail.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(query.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Parameter values are symbols, decimals, enums and client IDs, none of
/// which need percent-encoding.
fn encode(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, BinanceError> {
    serde_json::from_str(body).map_err(|e| BinanceError::JsonParse(e.to_string()))
}

fn map_transport(error: TransportError, path: &str) -> BinanceError {
    match error {
        TransportError::Network(msg) => BinanceError::Network(msg),
        TransportError::MaxRetriesExceeded { attempts, last } => {
            tracing::warn!(path, attempts, last = %last, "Binance retries exhausted");
            BinanceError::MaxRetriesExceeded { attempts }
        }
        TransportError::Status { status, body } => {
            let payload = serde_json::from_str::<BinanceErrorResponse>(&body).ok();
            let code = payload.as_ref().map_or(i64::from(status.as_u16()), |p| p.code);
            let message = payload.map_or(body, |p| p.msg);
            match status {
                StatusCode::TOO_MANY_REQUESTS | StatusCode::IM_A_TEAPOT => BinanceError::RateLimited,
                StatusCode::UNAUTHORIZED => BinanceError::AuthenticationFailed,
                _ if AUTH_CODES.contains(&code) => BinanceError::AuthenticationFailed,
                StatusCode::NOT_FOUND => BinanceError::NotFound {
                    resource: path.to_string(),
                },
                StatusCode::BAD_REQUEST
                    if path == "/api/v3/order" && REJECTION_CODES.contains(&code) =>
                {
                    BinanceError::OrderRejected(message)
                }
                _ => BinanceError::Api { code, message },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::venue::binance::BinanceEnvironment;

    #[test]
    fn signature_matches_published_example() {
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            sign(secret, query),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn signed_query_appends_window_timestamp_and_signature() {
        let config = BinanceConfig::new("k".into(), "secret".into(), BinanceEnvironment::Testnet);
        let client = BinanceHttpClient::new(&config).unwrap();

        let query = client.signed_query("symbol=BTCUSDT", 1_700_000_000_000);

        let (params, signature) = query.split_once("&signature=").unwrap();
        assert_eq!(params, "symbol=BTCUSDT&recvWindow=5000&timestamp=1700000000000");
        assert_eq!(signature, sign("secret", params));
    }

    #[test]
    fn insufficient_balance_on_order_is_rejection() {
        let err = map_transport(
            TransportError::Status {
                status: StatusCode::BAD_REQUEST,
                body: r#"{"code":-2010,"msg":"Account has insufficient balance for requested action."}"#
                    .to_string(),
            },
            "/api/v3/order",
        );
        assert!(matches!(err, BinanceError::OrderRejected(_)));
    }

    #[test]
    fn invalid_key_is_auth_failure() {
        let err = map_transport(
            TransportError::Status {
                status: StatusCode::BAD_REQUEST,
                body: r#"{"code":-2014,"msg":"API-key format invalid."}"#.to_string(),
            },
            "/api/v3/account",
        );
        assert!(matches!(err, BinanceError::AuthenticationFailed));
    }

    #[test]
    fn teapot_is_rate_limit() {
        let err = map_transport(
            TransportError::Status {
                status: StatusCode::IM_A_TEAPOT,
                body: String::new(),
            },
            "/api/v3/account",
        );
        assert!(matches!(err, BinanceError::RateLimited));
    }
}
