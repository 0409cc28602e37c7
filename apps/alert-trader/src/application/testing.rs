//! Hand-written port doubles shared by the application unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::application::ports::{
    CronRequest, DispatchError, DispatchRequest, DispatcherPort, VenueError, VenueFactory,
    VenuePort,
};
use crate::domain::accounts::{AccountCredentials, AccountName, AccountTable, CredentialSelector};
use crate::domain::market::{
    AccountBalance, Bar, HistoricalOrder, OrderAmount, OrderConfirmation, OrderRequest,
    PositionSnapshot, Quote, SymbolIncrement,
};
use crate::domain::shared::{Exchange, OrderSide, Symbol};

/// Saturday 15 June 2024, 12:00 UTC.
pub fn saturday_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Monday 17 June 2024, 15:00 UTC (11:00 New York, regular session).
pub fn monday_session() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 17, 15, 0, 0).unwrap()
}

/// Monday 17 June 2024, 12:00 UTC (08:00 New York, premarket).
pub fn monday_premarket() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 17, 12, 0, 0).unwrap()
}

/// Scriptable venue recording every call it receives.
pub struct ScriptedVenue {
    exchange: Exchange,
    pub balance: Mutex<AccountBalance>,
    pub positions: Mutex<HashMap<Symbol, PositionSnapshot>>,
    pub position_errors: Mutex<VecDeque<VenueError>>,
    pub quotes: Mutex<VecDeque<Result<Quote, VenueError>>>,
    pub bar: Mutex<Bar>,
    pub increment: Mutex<SymbolIncrement>,
    pub fractionable: Mutex<bool>,
    pub history: Mutex<HashMap<Symbol, Vec<HistoricalOrder>>>,
    pub fill_prices: Mutex<HashMap<Symbol, Decimal>>,
    pub submitted: Mutex<Vec<OrderRequest>>,
    pub reject_orders: Mutex<bool>,
    pub position_calls: AtomicU32,
    pub quote_calls: AtomicU32,
    pub bar_calls: AtomicU32,
}

impl ScriptedVenue {
    pub fn new(exchange: Exchange) -> Self {
        Self {
            exchange,
            balance: Mutex::new(AccountBalance::new(dec!(10000), dec!(10000))),
            positions: Mutex::new(HashMap::new()),
            position_errors: Mutex::new(VecDeque::new()),
            quotes: Mutex::new(VecDeque::new()),
            bar: Mutex::new(Bar::default()),
            increment: Mutex::new(SymbolIncrement::new(dec!(0.00001), dec!(0.01))),
            fractionable: Mutex::new(true),
            history: Mutex::new(HashMap::new()),
            fill_prices: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            reject_orders: Mutex::new(false),
            position_calls: AtomicU32::new(0),
            quote_calls: AtomicU32::new(0),
            bar_calls: AtomicU32::new(0),
        }
    }

    pub fn with_balance(self, equity: Decimal, cash: Decimal) -> Self {
        *self.balance.lock().unwrap() = AccountBalance::new(equity, cash);
        self
    }

    pub fn with_position(self, symbol: &str, quantity: Decimal) -> Self {
        let symbol = Symbol::new(symbol);
        self.positions
            .lock()
            .unwrap()
            .insert(symbol.clone(), PositionSnapshot::new(symbol, quantity, Decimal::ZERO));
        self
    }

    /// History is given newest first.
    pub fn with_history(self, symbol: &str, orders: Vec<HistoricalOrder>) -> Self {
        self.history
            .lock()
            .unwrap()
            .insert(Symbol::new(symbol), orders);
        self
    }

    pub fn with_fill_price(self, symbol: &str, price: Decimal) -> Self {
        self.fill_prices
            .lock()
            .unwrap()
            .insert(Symbol::new(symbol), price);
        self
    }

    pub fn with_quotes(self, quotes: Vec<Result<Quote, VenueError>>) -> Self {
        *self.quotes.lock().unwrap() = quotes.into();
        self
    }

    pub fn with_bar(self, high: Decimal, low: Decimal) -> Self {
        *self.bar.lock().unwrap() = Bar { high, low };
        self
    }

    pub fn with_fractionable(self, fractionable: bool) -> Self {
        *self.fractionable.lock().unwrap() = fractionable;
        self
    }

    pub fn with_increment(self, base: Decimal, quote: Decimal) -> Self {
        *self.increment.lock().unwrap() = SymbolIncrement::new(base, quote);
        self
    }

    pub fn with_position_errors(self, errors: Vec<VenueError>) -> Self {
        *self.position_errors.lock().unwrap() = errors.into();
        self
    }

    pub fn submitted(&self) -> Vec<OrderRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl VenuePort for ScriptedVenue {
    fn exchange(&self) -> Exchange {
        self.exchange
    }

    async fn get_account_balance(&self, _symbol: &Symbol) -> Result<AccountBalance, VenueError> {
        Ok(*self.balance.lock().unwrap())
    }

    async fn get_position(&self, symbol: &Symbol) -> Result<PositionSnapshot, VenueError> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.position_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.positions
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .ok_or_else(|| VenueError::NotFound {
                resource: format!("position {symbol}"),
            })
    }

    async fn get_latest_quote(&self, _symbol: &Symbol) -> Result<Quote, VenueError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Quote::default()))
    }

    async fn get_latest_bar(&self, _symbol: &Symbol) -> Result<Bar, VenueError> {
        self.bar_calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.bar.lock().unwrap())
    }

    async fn get_symbol_increment(&self, _symbol: &Symbol) -> Result<SymbolIncrement, VenueError> {
        Ok(*self.increment.lock().unwrap())
    }

    async fn is_fractionable(&self, _symbol: &Symbol) -> Result<bool, VenueError> {
        Ok(*self.fractionable.lock().unwrap())
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<OrderConfirmation, VenueError> {
        if *self.reject_orders.lock().unwrap() {
            return Err(VenueError::OrderRejected {
                reason: "scripted rejection".to_string(),
            });
        }
        self.submitted.lock().unwrap().push(request.clone());

        let fill_price = self.fill_prices.lock().unwrap().get(&request.symbol).copied();
        let filled_qty = match (request.amount, fill_price) {
            (OrderAmount::Quantity(qty), _) => qty,
            (OrderAmount::Notional(value), Some(price)) if !price.is_zero() => value / price,
            (OrderAmount::Notional(_), _) => Decimal::ZERO,
        };

        if let Some(price) = fill_price {
            let order = HistoricalOrder::at_price(request.side, filled_qty, price, saturday_noon());
            self.history
                .lock()
                .unwrap()
                .entry(request.symbol.clone())
                .or_default()
                .insert(0, order);
            if request.side == OrderSide::Sell {
                self.positions.lock().unwrap().remove(&request.symbol);
            }
        }

        Ok(OrderConfirmation {
            venue_order_id: format!("venue-{}", request.client_order_id),
            client_order_id: request.client_order_id,
            status: "filled".to_string(),
            filled_qty,
            filled_avg_price: fill_price,
        })
    }

    async fn get_recent_closed_orders(
        &self,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<Vec<HistoricalOrder>, VenueError> {
        Ok(self
            .history
            .lock()
            .unwrap()
            .get(symbol)
            .map(|orders| orders.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

/// Factory handing out one shared scripted venue.
pub struct SingleVenueFactory {
    pub venue: Arc<ScriptedVenue>,
    pub connections: Mutex<Vec<(Exchange, bool)>>,
}

impl SingleVenueFactory {
    pub fn new(venue: Arc<ScriptedVenue>) -> Self {
        Self {
            venue,
            connections: Mutex::new(Vec::new()),
        }
    }
}

impl VenueFactory for SingleVenueFactory {
    fn connect(
        &self,
        exchange: Exchange,
        credentials: &AccountCredentials,
    ) -> Result<Arc<dyn VenuePort>, VenueError> {
        self.connections
            .lock()
            .unwrap()
            .push((exchange, credentials.is_paper));
        Ok(self.venue.clone())
    }
}

/// Dispatcher that records requests.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub dispatched: Mutex<Vec<DispatchRequest>>,
    pub crons: Mutex<Vec<CronRequest>>,
}

#[async_trait]
impl DispatcherPort for RecordingDispatcher {
    async fn dispatch(&self, request: DispatchRequest) -> Result<(), DispatchError> {
        self.dispatched.lock().unwrap().push(request);
        Ok(())
    }

    async fn schedule_cron(&self, request: CronRequest) -> Result<(), DispatchError> {
        self.crons.lock().unwrap().push(request);
        Ok(())
    }
}

/// Live and paper credentials for both venues.
pub fn selector() -> CredentialSelector {
    let table = AccountTable::new([
        (
            Exchange::Alpaca,
            AccountName::Live,
            AccountCredentials::new("live-key", "live-secret", false),
        ),
        (
            Exchange::Alpaca,
            AccountName::Paper,
            AccountCredentials::new("paper-key", "paper-secret", true),
        ),
        (
            Exchange::Binance,
            AccountName::Live,
            AccountCredentials::new("bn-key", "bn-secret", false),
        ),
        (
            Exchange::Binance,
            AccountName::Paper,
            AccountCredentials::new("bn-test-key", "bn-test-secret", true),
        ),
    ])
    .unwrap();
    CredentialSelector::new(table)
}
