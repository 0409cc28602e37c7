//! Builds REST venue clients for resolved credentials.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{VenueError, VenueFactory, VenuePort};
use crate::application::retry::RetryPolicy;
use crate::domain::accounts::AccountCredentials;
use crate::domain::shared::Exchange;

use super::alpaca::{AlpacaConfig, AlpacaVenueAdapter};
use super::binance::{BinanceConfig, BinanceVenueAdapter};

/// `VenueFactory` producing Alpaca and Binance REST adapters.
#[derive(Debug, Clone)]
pub struct RestVenueFactory {
    retry: RetryPolicy,
    timeout: Duration,
}

impl Default for RestVenueFactory {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), Duration::from_secs(30))
    }
}

impl RestVenueFactory {
    /// Create a factory applying `retry` and `timeout` to every client.
    #[must_use]
    pub const fn new(retry: RetryPolicy, timeout: Duration) -> Self {
        Self { retry, timeout }
    }
}

impl VenueFactory for RestVenueFactory {
    fn connect(
        &self,
        exchange: Exchange,
        credentials: &AccountCredentials,
    ) -> Result<Arc<dyn VenuePort>, VenueError> {
        match exchange {
            Exchange::Alpaca => {
                let config = AlpacaConfig::from_credentials(credentials)
                    .with_timeout(self.timeout)
                    .with_retry(self.retry.clone());
                Ok(Arc::new(AlpacaVenueAdapter::new(config)?))
            }
            Exchange::Binance => {
                let mut config =
                    BinanceConfig::from_credentials(credentials).with_retry(self.retry.clone());
                config.timeout = self.timeout;
                Ok(Arc::new(BinanceVenueAdapter::new(&config)?))
            }
        }
    }
}
