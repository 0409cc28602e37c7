//! Quote Resolver
//!
//! Latest quote with a latest-bar fallback, retried as one unit.

use crate::application::ports::{VenueError, VenuePort};
use crate::application::retry::{RetryError, RetryPolicy, retry_with};
use crate::domain::market::Quote;
use crate::domain::shared::Symbol;
use crate::error::TradingError;

/// Attempts made before a quote is declared unavailable.
pub const QUOTE_ATTEMPTS: u32 = 3;

/// Resolves a usable quote for sizing.
#[derive(Debug, Clone)]
pub struct QuoteResolver {
    policy: RetryPolicy,
}

impl Default for QuoteResolver {
    fn default() -> Self {
        Self::new(RetryPolicy::immediate(QUOTE_ATTEMPTS))
    }
}

impl QuoteResolver {
    /// Create a resolver with a custom retry policy.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Resolve a quote with at least one non-zero side.
    ///
    /// Each attempt reads the latest quote and, when both sides are zero,
    /// the latest bar. Authentication failures are not retried.
    pub async fn resolve(
        &self,
        venue: &dyn VenuePort,
        symbol: &Symbol,
    ) -> Result<Quote, TradingError> {
        let result = retry_with(
            &self.policy,
            "resolve_quote",
            |_| fetch_once(venue, symbol),
            |e| !matches!(e, VenueError::AuthenticationFailed),
        )
        .await;

        match result {
            Ok(quote) => Ok(quote),
            Err(RetryError::Aborted { error, .. }) => Err(error.into()),
            Err(RetryError::Exhausted { attempts, last }) => {
                tracing::warn!(
                    symbol = %symbol,
                    attempts,
                    error = %last,
                    "No usable quote or bar"
                );
                Err(TradingError::QuoteUnavailable {
                    symbol: symbol.to_string(),
                    attempts,
                })
            }
        }
    }
}

async fn fetch_once(venue: &dyn VenuePort, symbol: &Symbol) -> Result<Quote, VenueError> {
    let quote = venue.get_latest_quote(symbol).await?;
    if !quote.is_empty() {
        return Ok(quote);
    }

    tracing::debug!(symbol = %symbol, "Quote empty, falling back to latest bar");
    let from_bar = Quote::from_bar(&venue.get_latest_bar(symbol).await?);
    if from_bar.is_empty() {
        return Err(VenueError::NotFound {
            resource: format!("quote or bar for {symbol}"),
        });
    }
    Ok(from_bar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::ScriptedVenue;
    use crate::domain::shared::Exchange;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn returns_live_quote() {
        let venue = ScriptedVenue::new(Exchange::Alpaca).with_quotes(vec![Ok(Quote::new(
            dec!(101),
            dec!(100),
            dec!(3),
            dec!(4),
        ))]);

        let quote = QuoteResolver::default()
            .resolve(&venue, &Symbol::new("AAPL"))
            .await
            .unwrap();

        assert_eq!(quote.bid_price, dec!(100));
        assert_eq!(venue.bar_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_quote_falls_back_to_bar() {
        let venue = ScriptedVenue::new(Exchange::Alpaca)
            .with_quotes(vec![Ok(Quote::default())])
            .with_bar(dec!(12.5), dec!(11.75));

        let quote = QuoteResolver::default()
            .resolve(&venue, &Symbol::new("AAPL"))
            .await
            .unwrap();

        assert_eq!(quote.ask_price, dec!(12.5));
        assert_eq!(quote.bid_price, dec!(11.75));
        assert_eq!(quote.ask_size, Decimal::ZERO);
    }

    #[tokio::test]
    async fn empty_quote_and_bar_exhausts_attempts() {
        let venue = ScriptedVenue::new(Exchange::Alpaca);

        let err = QuoteResolver::default()
            .resolve(&venue, &Symbol::new("AAPL"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TradingError::QuoteUnavailable { attempts: 3, .. }
        ));
        assert_eq!(venue.quote_calls.load(Ordering::SeqCst), 3);
        assert_eq!(venue.bar_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn transient_error_is_retried() {
        let venue = ScriptedVenue::new(Exchange::Alpaca).with_quotes(vec![
            Err(VenueError::RateLimited),
            Ok(Quote::new(dec!(5), dec!(4), dec!(1), dec!(1))),
        ]);

        let quote = QuoteResolver::default()
            .resolve(&venue, &Symbol::new("AAPL"))
            .await
            .unwrap();

        assert_eq!(quote.ask_price, dec!(5));
        assert_eq!(venue.quote_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn authentication_failure_is_not_retried() {
        let venue = ScriptedVenue::new(Exchange::Alpaca)
            .with_quotes(vec![Err(VenueError::AuthenticationFailed)]);

        let err = QuoteResolver::default()
            .resolve(&venue, &Symbol::new("AAPL"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TradingError::Venue(VenueError::AuthenticationFailed)
        ));
        assert_eq!(venue.quote_calls.load(Ordering::SeqCst), 1);
    }
}
