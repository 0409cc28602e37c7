//! Binance venue adapter implementing `VenuePort`.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use rust_decimal::Decimal;

use super::api_types::{AccountInfo, BinanceOrder, BookTicker, ExchangeInfo, SymbolInfo};
use super::config::BinanceConfig;
use super::error::BinanceError;
use super::http_client::BinanceHttpClient;
use crate::application::ports::{VenueError, VenuePort};
use crate::domain::market::{
    AccountBalance, Bar, HistoricalOrder, OrderAmount, OrderConfirmation, OrderRequest,
    PositionSnapshot, Quote, SymbolIncrement,
};
use crate::domain::shared::{Exchange, OrderSide, OrderType, Symbol, TimeInForce};

/// Binance spot venue adapter.
#[derive(Debug, Clone)]
pub struct BinanceVenueAdapter {
    client: BinanceHttpClient,
}

impl BinanceVenueAdapter {
    /// Create a new Binance venue adapter.
    pub fn new(config: &BinanceConfig) -> Result<Self, BinanceError> {
        let client = BinanceHttpClient::new(config)?;
        tracing::debug!(environment = %config.environment, "Binance adapter created");
        Ok(Self { client })
    }

    async fn symbol_info(&self, symbol: &Symbol) -> Result<SymbolInfo, BinanceError> {
        let info: ExchangeInfo = self
            .client
            .public_get("/api/v3/exchangeInfo", &[("symbol", symbol.compact())])
            .await?;
        info.symbols
            .into_iter()
            .find(|s| s.symbol == symbol.compact())
            .ok_or_else(|| BinanceError::NotFound {
                resource: format!("symbol {symbol}"),
            })
    }

    async fn free_and_locked(&self, asset: &str) -> Result<(Decimal, Decimal), BinanceError> {
        let account: AccountInfo = self
            .client
            .signed(Method::GET, "/api/v3/account", &[])
            .await?;
        match account.balances.iter().find(|b| b.asset == asset) {
            Some(balance) => Ok((
                parse_decimal("free", &balance.free)?,
                parse_decimal("locked", &balance.locked)?,
            )),
            None => Ok((Decimal::ZERO, Decimal::ZERO)),
        }
    }

    async fn book_ticker(&self, symbol: &Symbol) -> Result<BookTicker, BinanceError> {
        self.client
            .public_get("/api/v3/ticker/bookTicker", &[("symbol", symbol.compact())])
            .await
    }

    fn order_params(request: &OrderRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("symbol", request.symbol.compact()),
            ("side", request.side.to_string()),
            ("type", request.order_type.to_string()),
        ];
        match request.amount {
            OrderAmount::Notional(value) => params.push(("quoteOrderQty", value.normalize().to_string())),
            OrderAmount::Quantity(value) => params.push(("quantity", value.normalize().to_string())),
        }
        if request.order_type == OrderType::Limit {
            // Spot has no day orders.
            let tif = match request.time_in_force {
                TimeInForce::Ioc => "IOC",
                TimeInForce::Day | TimeInForce::Gtc => "GTC",
            };
            params.push(("timeInForce", tif.to_string()));
            if let Some(price) = request.limit_price {
                params.push(("price", price.normalize().to_string()));
            }
        }
        params.push(("newClientOrderId", request.client_order_id.clone()));
        params
    }
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, BinanceError> {
    Decimal::from_str(value)
        .map(|d| d.normalize())
        .map_err(|_| BinanceError::InvalidField {
            field,
            value: value.to_string(),
        })
}

fn parse_side(value: Option<&str>) -> Result<OrderSide, BinanceError> {
    match value {
        Some("BUY") => Ok(OrderSide::Buy),
        Some("SELL") => Ok(OrderSide::Sell),
        other => Err(BinanceError::InvalidField {
            field: "side",
            value: other.unwrap_or_default().to_string(),
        }),
    }
}

fn from_millis(field: &'static str, millis: i64) -> Result<DateTime<Utc>, BinanceError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| BinanceError::InvalidField {
        field,
        value: millis.to_string(),
    })
}

fn kline_field(kline: &[serde_json::Value], index: usize, field: &'static str) -> Result<Decimal, BinanceError> {
    let raw = kline
        .get(index)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| BinanceError::InvalidField {
            field,
            value: format!("{kline:?}"),
        })?;
    parse_decimal(field, raw)
}

#[async_trait]
impl VenuePort for BinanceVenueAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    #[tracing::instrument(skip(self))]
    async fn get_account_balance(&self, symbol: &Symbol) -> Result<AccountBalance, VenueError> {
        let info = self.symbol_info(symbol).await?;
        let (free, _) = self.free_and_locked(&info.quote_asset).await?;
        tracing::debug!(asset = %info.quote_asset, free = %free, "Quote asset balance");
        Ok(AccountBalance::new(free, free))
    }

    #[tracing::instrument(skip(self))]
    async fn get_position(&self, symbol: &Symbol) -> Result<PositionSnapshot, VenueError> {
        let info = self.symbol_info(symbol).await?;
        let (free, locked) = self.free_and_locked(&info.base_asset).await?;
        let quantity = free + locked;
        if quantity.is_zero() {
            return Err(BinanceError::NotFound {
                resource: format!("{} balance", info.base_asset),
            }
            .into());
        }
        let ticker = self.book_ticker(symbol).await?;
        let bid = parse_decimal("bidPrice", &ticker.bid_price)?;
        Ok(PositionSnapshot::new(symbol.clone(), quantity, quantity * bid))
    }

    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<Quote, VenueError> {
        let ticker = self.book_ticker(symbol).await?;
        Ok(Quote::new(
            parse_decimal("askPrice", &ticker.ask_price)?,
            parse_decimal("bidPrice", &ticker.bid_price)?,
            parse_decimal("askQty", &ticker.ask_qty)?,
            parse_decimal("bidQty", &ticker.bid_qty)?,
        ))
    }

    async fn get_latest_bar(&self, symbol: &Symbol) -> Result<Bar, VenueError> {
        let klines: Vec<Vec<serde_json::Value>> = self
            .client
            .public_get(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.compact()),
                    ("interval", "1m".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        let Some(kline) = klines.first() else {
            return Err(BinanceError::NotFound {
                resource: format!("klines {symbol}"),
            }
            .into());
        };
        Ok(Bar {
            high: kline_field(kline, 2, "high")?,
            low: kline_field(kline, 3, "low")?,
        })
    }

    async fn get_symbol_increment(&self, symbol: &Symbol) -> Result<SymbolIncrement, VenueError> {
        let info = self.symbol_info(symbol).await?;
        let step = info.lot_step().ok_or_else(|| BinanceError::NotFound {
            resource: format!("LOT_SIZE filter for {symbol}"),
        })?;
        Ok(SymbolIncrement::new(
            parse_decimal("stepSize", step)?,
            Decimal::new(1, info.quote_asset_precision),
        ))
    }

    async fn is_fractionable(&self, _symbol: &Symbol) -> Result<bool, VenueError> {
        Ok(true)
    }

    #[tracing::instrument(skip(self, request), fields(symbol = %request.symbol, side = %request.side))]
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderConfirmation, VenueError> {
        let params = Self::order_params(&request);
        let order: BinanceOrder = self
            .client
            .signed(Method::POST, "/api/v3/order", &params)
            .await?;

        let filled_qty = parse_decimal("executedQty", &order.executed_qty)?;
        let quote_qty = parse_decimal("cummulativeQuoteQty", &order.cummulative_quote_qty)?;
        let filled_avg_price = (filled_qty > Decimal::ZERO).then(|| quote_qty / filled_qty);

        tracing::info!(
            order_id = order.order_id,
            client_order_id = %order.client_order_id,
            status = %order.status,
            "Binance order accepted"
        );
        Ok(OrderConfirmation {
            venue_order_id: order.order_id.to_string(),
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
        let orders: Vec<BinanceOrder> = self
            .client
            .signed(
                Method::GET,
                "/api/v3/allOrders",
                &[("symbol", symbol.compact()), ("limit", limit.to_string())],
            )
            .await?;

        // allOrders is oldest first.
        let mut history = Vec::with_capacity(orders.len());
        for order in orders.iter().rev() {
            let filled_qty = parse_decimal("executedQty", &order.executed_qty)?;
            if filled_qty <= Decimal::ZERO {
                continue;
            }
            let Some(millis) = order.update_time.or(order.transact_time) else {
                continue;
            };
            history.push(HistoricalOrder::new(
                parse_side(order.side.as_deref())?,
                filled_qty,
                parse_decimal("cummulativeQuoteQty", &order.cummulative_quote_qty)?,
                from_millis("updateTime", millis)?,
            ));
        }
        Ok(history)
    }
}
