//! Alpaca venue adapter implementing `VenuePort`.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::api_types::{
    AlpacaAccount, AlpacaAsset, AlpacaBar, AlpacaOrder, AlpacaOrderRequest, AlpacaPosition,
    AlpacaQuote, CryptoLatestBars, CryptoLatestQuotes, StockLatestBar, StockLatestQuote,
};
use super::config::AlpacaConfig;
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;
use crate::application::ports::{VenueError, VenuePort};
use crate::domain::market::{
    AccountBalance, Bar, HistoricalOrder, OrderAmount, OrderConfirmation, OrderRequest,
    PositionSnapshot, Quote, SymbolIncrement,
};
use crate::domain::shared::{Exchange, OrderSide, Symbol};

/// Smallest fractional share quantity Alpaca accepts.
const FRACTIONAL_SHARE_STEP: Decimal = dec!(0.000000001);
const CENT: Decimal = dec!(0.01);

/// Alpaca venue adapter.
#[derive(Debug, Clone)]
pub struct AlpacaVenueAdapter {
    client: AlpacaHttpClient,
    config: AlpacaConfig,
}

impl AlpacaVenueAdapter {
    /// Create a new Alpaca venue adapter.
    pub fn new(config: AlpacaConfig) -> Result<Self, AlpacaError> {
        let client = AlpacaHttpClient::new(&config)?;
        tracing::debug!(environment = %config.environment, "Alpaca adapter created");
        Ok(Self { client, config })
    }

    /// Check if this adapter is configured for live trading.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.config.environment.is_live()
    }

    fn to_alpaca_order_request(request: &OrderRequest) -> AlpacaOrderRequest {
        let (qty, notional) = match request.amount {
            OrderAmount::Quantity(q) => (Some(q.normalize().to_string()), None),
            OrderAmount::Notional(n) => (None, Some(n.normalize().to_string())),
        };
        AlpacaOrderRequest {
            symbol: request.symbol.as_str().to_string(),
            qty,
            notional,
            side: request.side.as_str().to_string(),
            order_type: request.order_type.as_str().to_string(),
            time_in_force: request.time_in_force.as_str().to_string(),
            limit_price: request.limit_price.map(|p| p.normalize().to_string()),
            client_order_id: request.client_order_id.clone(),
            extended_hours: request.extended_hours,
        }
    }

    async fn asset(&self, symbol: &Symbol) -> Result<AlpacaAsset, AlpacaError> {
        self.client
            .get(&format!("/v2/assets/{}", symbol.compact()), &[])
            .await
    }

    async fn latest_quote(&self, symbol: &Symbol) -> Result<AlpacaQuote, AlpacaError> {
        if symbol.is_crypto_pair() {
            let response: CryptoLatestQuotes = self
                .client
                .data_get(
                    "/v1beta3/crypto/us/latest/quotes",
                    &[("symbols", symbol.as_str().to_string())],
                )
                .await?;
            Ok(response
                .quotes
                .get(symbol.as_str())
                .copied()
                .unwrap_or_default())
        } else {
            let response: StockLatestQuote = self
                .client
                .data_get(&format!("/v2/stocks/{symbol}/quotes/latest"), &[])
                .await?;
            Ok(response.quote)
        }
    }

    async fn latest_bar(&self, symbol: &Symbol) -> Result<AlpacaBar, AlpacaError> {
        if symbol.is_crypto_pair() {
            let response: CryptoLatestBars = self
                .client
                .data_get(
                    "/v1beta3/crypto/us/latest/bars",
                    &[("symbols", symbol.as_str().to_string())],
                )
                .await?;
            Ok(response
                .bars
                .get(symbol.as_str())
                .copied()
                .unwrap_or_default())
        } else {
            let response: StockLatestBar = self
                .client
                .data_get(&format!("/v2/stocks/{symbol}/bars/latest"), &[])
                .await?;
            Ok(response.bar)
        }
    }
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, AlpacaError> {
    Decimal::from_str(value).map_err(|_| AlpacaError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn from_float(field: &'static str, value: f64) -> Result<Decimal, AlpacaError> {
    Decimal::try_from(value)
        .map(|d| d.normalize())
        .map_err(|_| AlpacaError::InvalidField {
            field,
            value: value.to_string(),
        })
}

fn parse_side(value: &str) -> Result<OrderSide, AlpacaError> {
    match value {
        "buy" => Ok(OrderSide::Buy),
        "sell" => Ok(OrderSide::Sell),
        other => Err(AlpacaError::InvalidField {
            field: "side",
            value: other.to_string(),
        }),
    }
}

/// Filled orders with a fill timestamp; everything else is skipped.
fn to_historical(order: &AlpacaOrder) -> Result<Option<HistoricalOrder>, AlpacaError> {
    let filled_qty = match order.filled_qty.as_deref() {
        Some(q) => parse_decimal("filled_qty", q)?,
        None => Decimal::ZERO,
    };
    let (Some(price), Some(filled_at)) = (order.filled_avg_price.as_deref(), order.filled_at)
    else {
        return Ok(None);
    };
    if filled_qty <= Decimal::ZERO {
        return Ok(None);
    }
    Ok(Some(HistoricalOrder::at_price(
        parse_side(&order.side)?,
        filled_qty,
        parse_decimal("filled_avg_price", price)?,
        filled_at,
    )))
}

#[async_trait]
impl VenuePort for AlpacaVenueAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::Alpaca
    }

    #[tracing::instrument(skip(self))]
    async fn get_account_balance(&self, symbol: &Symbol) -> Result<AccountBalance, VenueError> {
        let account: AlpacaAccount = self.client.get("/v2/account", &[]).await?;
        Ok(AccountBalance::new(
            parse_decimal("equity", &account.equity)?,
            parse_decimal("cash", &account.cash)?,
        ))
    }

    #[tracing::instrument(skip(self))]
    async fn get_position(&self, symbol: &Symbol) -> Result<PositionSnapshot, VenueError> {
        let position: AlpacaPosition = self
            .client
            .get(&format!("/v2/positions/{}", symbol.compact()), &[])
            .await?;
        let quantity = parse_decimal("qty", &position.qty)?;
        let market_value = match position.market_value.as_deref() {
            Some(v) => parse_decimal("market_value", v)?,
            None => Decimal::ZERO,
        };
        tracing::debug!(venue_symbol = %position.symbol, quantity = %quantity, "Position read");
        Ok(PositionSnapshot::new(symbol.clone(), quantity, market_value))
    }

    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<Quote, VenueError> {
        let quote = self.latest_quote(symbol).await?;
        Ok(Quote::new(
            from_float("ap", quote.ap)?,
            from_float("bp", quote.bp)?,
            from_float("as", quote.ask_size)?,
            from_float("bs", quote.bs)?,
        ))
    }

    async fn get_latest_bar(&self, symbol: &Symbol) -> Result<Bar, VenueError> {
        let bar = self.latest_bar(symbol).await?;
        Ok(Bar {
            high: from_float("h", bar.h)?,
            low: from_float("l", bar.l)?,
        })
    }

    async fn get_symbol_increment(&self, symbol: &Symbol) -> Result<SymbolIncrement, VenueError> {
        let asset = self.asset(symbol).await?;
        let base = match asset.min_trade_increment.as_deref() {
            Some(step) => parse_decimal("min_trade_increment", step)?,
            None if asset.fractionable => FRACTIONAL_SHARE_STEP,
            None => Decimal::ONE,
        };
        let quote = match asset.price_increment.as_deref() {
            Some(step) => parse_decimal("price_increment", step)?,
            None => CENT,
        };
        Ok(SymbolIncrement::new(base, quote))
    }

    async fn is_fractionable(&self, symbol: &Symbol) -> Result<bool, VenueError> {
        Ok(self.asset(symbol).await?.fractionable)
    }

    #[tracing::instrument(skip(self, request), fields(symbol = %request.symbol, side = %request.side))]
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderConfirmation, VenueError> {
        let alpaca_request = Self::to_alpaca_order_request(&request);
        let order: AlpacaOrder = self.client.post("/v2/orders", &alpaca_request).await?;

        let filled_qty = match order.filled_qty.as_deref() {
            Some(q) => parse_decimal("filled_qty", q)?,
            None => Decimal::ZERO,
        };
        let filled_avg_price = order
            .filled_avg_price
            .as_deref()
            .map(|p| parse_decimal("filled_avg_price", p))
            .transpose()?;

        tracing::info!(
            order_id = %order.id,
            client_order_id = %order.client_order_id,
            status = %order.status,
            "Alpaca order accepted"
        );
        Ok(OrderConfirmation {
            venue_order_id: order.id,
            client_order_id: order.client_order_id,
            status: order.status,
            filled_qty,
            filled_avg_price,
        })
    }

    async fn get_recent_closed_orders(
        &self,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<Vec<HistoricalOrder>, VenueError> {
        let orders: Vec<AlpacaOrder> = self
            .client
            .get(
                "/v2/orders",
                &[
                    ("status", "closed".to_string()),
                    ("symbols", symbol.as_str().to_string()),
                    ("limit", limit.to_string()),
                    ("direction", "desc".to_string()),
                ],
            )
            .await?;

        let mut history = Vec::with_capacity(orders.len());
        for order in &orders {
            if let Some(historical) = to_historical(order)? {
                history.push(historical);
            }
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::retry::RetryPolicy;
    use crate::domain::shared::TimeInForce;
    use crate::infrastructure::venue::alpaca::AlpacaEnvironment;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn adapter(server: &MockServer) -> AlpacaVenueAdapter {
        let config = AlpacaConfig::new("key".into(), "secret".into(), AlpacaEnvironment::Paper)
            .with_base_urls(server.uri(), server.uri())
            .with_retry(RetryPolicy::immediate(2));
        AlpacaVenueAdapter::new(config).unwrap()
    }

    #[test]
    fn to_alpaca_order_request_market_notional() {
        let request = OrderRequest::market(
            Symbol::new("TQQQ"),
            OrderSide::Buy,
            OrderAmount::Notional(dec!(4995.00)),
        );
        let alpaca = AlpacaVenueAdapter::to_alpaca_order_request(&request);

        assert_eq!(alpaca.notional.as_deref(), Some("4995"));
        assert!(alpaca.qty.is_none());
        assert_eq!(alpaca.side, "buy");
        assert_eq!(alpaca.order_type, "market");
        assert_eq!(alpaca.time_in_force, "day");
    }

    #[test]
    fn to_alpaca_order_request_extended_hours_limit() {
        let request = OrderRequest::limit(Symbol::new("TQQQ"), OrderSide::Buy, dec!(9), dec!(50))
            .with_extended_hours();
        let alpaca = AlpacaVenueAdapter::to_alpaca_order_request(&request);

        assert_eq!(alpaca.qty.as_deref(), Some("9"));
        assert_eq!(alpaca.limit_price.as_deref(), Some("50"));
        assert!(alpaca.extended_hours);
    }

    #[test]
    fn to_alpaca_order_request_gtc() {
        let request = OrderRequest::market(
            Symbol::new("BTC/USD"),
            OrderSide::Buy,
            OrderAmount::Notional(dec!(100)),
        )
        .with_time_in_force(TimeInForce::Gtc);
        let alpaca = AlpacaVenueAdapter::to_alpaca_order_request(&request);

        assert_eq!(alpaca.symbol, "BTC/USD");
        assert_eq!(alpaca.time_in_force, "gtc");
    }

    #[tokio::test]
    async fn account_balance_sends_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/account"))
            .and(header("APCA-API-KEY-ID", "key"))
            .and(header("APCA-API-SECRET-KEY", "secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"equity": "10250.50", "cash": "4000"})),
            )
            .mount(&server)
            .await;

        let balance = adapter(&server)
            .await
            .get_account_balance(&Symbol::new("TQQQ"))
            .await
            .unwrap();

        assert_eq!(balance.equity, dec!(10250.50));
        assert_eq!(balance.cash, dec!(4000));
    }

    #[tokio::test]
    async fn missing_position_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/positions/BTCUSD"))
            .respond_with(ResponseTemplate::new(404).set_body_json(
                serde_json::json!({"code": 40410000, "message": "position does not exist"}),
            ))
            .mount(&server)
            .await;

        let err = adapter(&server)
            .await
            .get_position(&Symbol::new("BTC/USD"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn crypto_quote_uses_v1beta3_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta3/crypto/us/latest/quotes"))
            .and(query_param("symbols", "BTC/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "quotes": {"BTC/USD": {"ap": 65000.5, "bp": 64990.25, "as": 0.5, "bs": 1.0}}
            })))
            .mount(&server)
            .await;

        let quote = adapter(&server)
            .await
            .get_latest_quote(&Symbol::new("BTC/USD"))
            .await
            .unwrap();

        assert_eq!(quote.ask_price, dec!(65000.5));
        assert_eq!(quote.bid_price, dec!(64990.25));
    }

    #[tokio::test]
    async fn stock_bar_reads_high_and_low() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/stocks/TQQQ/bars/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "symbol": "TQQQ",
                "bar": {"o": 50.0, "h": 51.25, "l": 49.5, "c": 50.5, "v": 1000}
            })))
            .mount(&server)
            .await;

        let bar = adapter(&server)
            .await
            .get_latest_bar(&Symbol::new("TQQQ"))
            .await
            .unwrap();

        assert_eq!(bar.high, dec!(51.25));
        assert_eq!(bar.low, dec!(49.5));
    }

    #[tokio::test]
    async fn whole_share_asset_has_unit_step() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/assets/SQQQ"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"symbol": "SQQQ", "fractionable": false})),
            )
            .mount(&server)
            .await;
        let adapter = adapter(&server).await;

        let increment = adapter.get_symbol_increment(&Symbol::new("SQQQ")).await.unwrap();
        assert_eq!(increment.base_asset_precision, Decimal::ONE);
        assert_eq!(increment.quote_asset_precision, dec!(0.01));
        assert!(!adapter.is_fractionable(&Symbol::new("SQQQ")).await.unwrap());
    }

    #[tokio::test]
    async fn submit_order_posts_lowercase_terms() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .and(body_partial_json(serde_json::json!({
                "symbol": "TQQQ",
                "notional": "500.25",
                "side": "buy",
                "type": "market",
                "time_in_force": "day"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "order-1",
                "client_order_id": "at-1",
                "status": "accepted",
                "side": "buy",
                "filled_qty": "0",
                "filled_avg_price": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let confirmation = adapter(&server)
            .await
            .submit_order(OrderRequest::market(
                Symbol::new("TQQQ"),
                OrderSide::Buy,
                OrderAmount::Notional(dec!(500.25)),
            ))
            .await
            .unwrap();

        assert_eq!(confirmation.venue_order_id, "order-1");
        assert_eq!(confirmation.filled_qty, Decimal::ZERO);
        assert!(confirmation.filled_avg_price.is_none());
    }

    #[tokio::test]
    async fn insufficient_buying_power_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .respond_with(ResponseTemplate::new(403).set_body_json(
                serde_json::json!({"code": 40310000, "message": "insufficient buying power"}),
            ))
            .mount(&server)
            .await;

        let err = adapter(&server)
            .await
            .submit_order(OrderRequest::market(
                Symbol::new("TQQQ"),
                OrderSide::Buy,
                OrderAmount::Notional(dec!(1000000)),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, VenueError::OrderRejected { .. }));
    }

    #[tokio::test]
    async fn closed_orders_skip_unfilled_and_keep_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/orders"))
            .and(query_param("status", "closed"))
            .and(query_param("symbols", "SQQQ"))
            .and(query_param("limit", "50"))
            .and(query_param("direction", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "3", "client_order_id": "c3", "status": "canceled", "side": "sell",
                 "filled_qty": "0", "filled_avg_price": null, "filled_at": null},
                {"id": "2", "client_order_id": "c2", "status": "filled", "side": "sell",
                 "filled_qty": "10", "filled_avg_price": "25", "filled_at": "2024-06-17T15:00:00Z"},
                {"id": "1", "client_order_id": "c1", "status": "filled", "side": "buy",
                 "filled_qty": "10", "filled_avg_price": "20", "filled_at": "2024-06-14T15:00:00Z"}
            ])))
            .mount(&server)
            .await;

        let history = adapter(&server)
            .await
            .get_recent_closed_orders(&Symbol::new("SQQQ"), 50)
            .await
            .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].side, OrderSide::Sell);
        assert_eq!(history[0].filled_notional, dec!(250));
        assert_eq!(history[1].unit_price(), dec!(20));
    }
}
