//! Submit Pair Trade Use Case
//!
//! Drives one alert through close → tax → open → schedule. The ordering is
//! fixed: the new position is only sized after realized tax has been settled,
//! so the reservation is already deducted from the capital being deployed.
//! Any failure aborts the remaining steps and propagates unchanged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    DispatcherPort, RealizedTrade, TakeProfitItem, TakeProfitQueuePort, TaxLedgerPort,
    TimeSource, VenueFactory, VenuePort,
};
use crate::application::services::{BalanceReader, PositionReader, QuoteResolver, Scheduler};
use crate::domain::accounts::{AccountName, CredentialSelector, DevelopmentMode};
use crate::domain::market::{
    HistoricalOrder, OrderAmount, OrderConfirmation, OrderRequest, Quote, ValidatedAlert,
};
use crate::domain::market_clock::{MarketClock, SessionSchedule};
use crate::domain::pairs::{PairBook, PairConfig};
use crate::domain::profit_loss::{match_latest_disposal, most_recent_fill_side};
use crate::domain::scheduling::ScheduledCheck;
use crate::domain::shared::{Exchange, OrderSide, OrderType, Symbol, TimeInForce};
use crate::domain::sizing::{
    BalanceAllocation, EquitySizingInput, floor_to_step, size_by_balance, size_by_equity,
};
use crate::domain::tax::tax_due;
use crate::error::TradingError;
use crate::observability::{record_order_submission, record_realized_trade};

/// Trading knobs shared by the workflows.
#[derive(Debug, Clone)]
pub struct TradingSettings {
    /// Route every request to the paper account.
    pub dev_mode: DevelopmentMode,
    /// Tax rate applied to realized gains, in `[0, 1]`.
    pub tax_rate: Decimal,
    /// Capital share used when an alert does not carry one.
    pub default_capital_percentage: Decimal,
    /// Allow limit entries in the Alpaca premarket window.
    pub premarket_trading: bool,
    /// Retries after the first position read.
    pub position_retries: u32,
    /// Closed orders fetched for fill-side checks and P/L matching.
    pub recent_order_limit: usize,
}

impl TradingSettings {
    /// Session whose interval grid drives rechecks: the 04:00 grid when
    /// premarket trading is on, the regular session otherwise.
    #[must_use]
    pub const fn recheck_schedule(&self) -> SessionSchedule {
        if self.premarket_trading {
            SessionSchedule::premarket()
        } else {
            SessionSchedule::regular()
        }
    }
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            dev_mode: DevelopmentMode::default(),
            tax_rate: dec!(0.2),
            default_capital_percentage: dec!(0.97),
            premarket_trading: true,
            position_retries: 2,
            recent_order_limit: 50,
        }
    }
}

/// Workflow states; every run starts at `Idle` and ends at `RecheckScheduled`
/// or `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    /// Nothing done yet.
    Idle,
    /// Credentials selected and venue client built.
    CredentialsResolved,
    /// An order amount was computed.
    SizeComputed,
    /// An order was accepted by the venue.
    OrderSubmitted,
    /// Tax was reserved and the trade recorded.
    TaxSettled,
    /// No tax was due or it was reinvested.
    TaxSkipped,
    /// A follow-up check was handed to the dispatcher.
    RecheckScheduled,
    /// Run finished.
    Done,
}

/// Input for one pair trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTradeCommand {
    /// Venue.
    pub exchange: Exchange,
    /// Alert ticker; either leg of a configured pair.
    pub symbol: Symbol,
    /// Close price when the alert fired.
    pub price: Decimal,
    /// Chart interval driving the recheck, if any.
    pub interval_minutes: Option<u32>,
    /// Signal direction.
    pub side: OrderSide,
    /// Share of capital to deploy; defaults from settings.
    pub capital_percentage: Option<Decimal>,
    /// Keep realized tax invested instead of reserving it.
    pub reinvest_tax: bool,
    /// Schedule a recheck at the next interval boundary.
    pub schedule_recheck: bool,
    /// Account; defaults to live.
    pub account: Option<AccountName>,
}

impl PairTradeCommand {
    /// Command for a validated alert with default options.
    #[must_use]
    pub fn from_alert(exchange: Exchange, alert: ValidatedAlert) -> Self {
        Self {
            exchange,
            symbol: alert.symbol,
            price: alert.price,
            interval_minutes: alert.interval_minutes,
            side: alert.side,
            capital_percentage: None,
            reinvest_tax: false,
            schedule_recheck: true,
            account: None,
        }
    }
}

/// Closing leg summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedLeg {
    /// Symbol sold.
    pub symbol: Symbol,
    /// Quantity sold.
    pub quantity: Decimal,
    /// Realized result of the disposal.
    pub profit_or_loss: Decimal,
    /// Tax reserved against it.
    pub tax_reserved: Decimal,
}

/// Opening leg summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenedLeg {
    /// Symbol bought.
    pub symbol: Symbol,
    /// Amount submitted.
    pub amount: OrderAmount,
    /// Order type used.
    pub order_type: OrderType,
    /// Client order ID.
    pub client_order_id: String,
}

/// Result of a pair trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairTradeOutcome {
    /// States visited, in order.
    pub states: Vec<OrchestratorState>,
    /// Closing leg, when a position was closed.
    pub closed: Option<ClosedLeg>,
    /// Opening leg, when a position was opened.
    pub opened: Option<OpenedLeg>,
    /// Recheck instant, when one was scheduled.
    pub recheck_at: Option<DateTime<Utc>>,
}

/// Ordered record of visited states.
struct StateTrail {
    exchange: Exchange,
    symbol: Symbol,
    states: Vec<OrchestratorState>,
}

impl StateTrail {
    fn start(exchange: Exchange, symbol: Symbol) -> Self {
        let mut trail = Self {
            exchange,
            symbol,
            states: Vec::new(),
        };
        trail.advance(OrchestratorState::Idle);
        trail
    }

    fn advance(&mut self, state: OrchestratorState) {
        tracing::info!(
            exchange = %self.exchange,
            symbol = %self.symbol,
            state = ?state,
            "Pair trade state"
        );
        self.states.push(state);
    }
}

/// Use case for alert-driven pair trades.
pub struct SubmitPairTradeUseCase<F, L, Q, D>
where
    F: VenueFactory,
    L: TaxLedgerPort,
    Q: TakeProfitQueuePort,
    D: DispatcherPort,
{
    venues: Arc<F>,
    selector: Arc<CredentialSelector>,
    pairs: Arc<PairBook>,
    ledger: Arc<L>,
    take_profit_queue: Arc<Q>,
    scheduler: Arc<Scheduler<D>>,
    time: Arc<dyn TimeSource>,
    settings: TradingSettings,
    quotes: QuoteResolver,
    positions: PositionReader,
}

impl<F, L, Q, D> SubmitPairTradeUseCase<F, L, Q, D>
where
    F: VenueFactory,
    L: TaxLedgerPort,
    Q: TakeProfitQueuePort,
    D: DispatcherPort,
{
    /// Create a new `SubmitPairTradeUseCase`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        venues: Arc<F>,
        selector: Arc<CredentialSelector>,
        pairs: Arc<PairBook>,
        ledger: Arc<L>,
        take_profit_queue: Arc<Q>,
        scheduler: Arc<Scheduler<D>>,
        time: Arc<dyn TimeSource>,
        settings: TradingSettings,
    ) -> Self {
        Self {
            venues,
            selector,
            pairs,
            ledger,
            take_profit_queue,
            scheduler,
            time,
            settings,
            quotes: QuoteResolver::default(),
            positions: PositionReader::default(),
        }
    }

    /// Replace the quote resolver and position reader.
    #[must_use]
    pub fn with_readers(mut self, quotes: QuoteResolver, positions: PositionReader) -> Self {
        self.quotes = quotes;
        self.positions = positions;
        self
    }

    /// Run the pair trade for one alert.
    #[tracing::instrument(skip(self, command), fields(exchange = %command.exchange, symbol = %command.symbol, side = ?command.side))]
    pub async fn execute(&self, command: PairTradeCommand) -> Result<PairTradeOutcome, TradingError> {
        let mut trail = StateTrail::start(command.exchange, command.symbol.clone());

        let pair = self
            .pairs
            .find(command.exchange, &command.symbol)
            .ok_or_else(|| TradingError::UnknownPair {
                exchange: command.exchange,
                symbol: command.symbol.clone(),
            })?;
        let legs = pair.legs(command.side);

        let account = CredentialSelector::resolve_account(command.account, self.settings.dev_mode);
        let credentials =
            self.selector
                .select(command.exchange, command.account, self.settings.dev_mode)?;
        let venue = self.venues.connect(command.exchange, credentials)?;
        trail.advance(OrchestratorState::CredentialsResolved);

        let now = self.time.now();

        // 1. Close
        let closed = match &legs.close {
            Some(symbol) => {
                self.close_leg(venue.as_ref(), pair, symbol, &command, now, &mut trail)
                    .await?
            }
            None => None,
        };

        // 2. Open
        let opened = match &legs.target {
            Some(symbol) => {
                self.open_leg(venue.as_ref(), symbol, &command, now, &mut trail)
                    .await?
            }
            None => None,
        };
        if closed.is_none() && opened.is_some() {
            trail.advance(OrchestratorState::TaxSkipped);
        }

        if let (Some(opened), Some(pct)) = (&opened, pair.take_profit_pct) {
            self.queue_take_profit(venue.as_ref(), account, opened, pct, &command, now)
                .await?;
        }

        // 3. Schedule
        let recheck_at = match (command.schedule_recheck, command.interval_minutes) {
            (true, Some(interval)) => {
                let symbol = legs.target.clone().unwrap_or_else(|| pair.long_symbol.clone());
                let clock = MarketClock::for_symbol(
                    command.exchange,
                    &symbol,
                    self.settings.recheck_schedule(),
                );
                let check = ScheduledCheck {
                    target_symbol: symbol,
                    exchange: command.exchange,
                    account,
                    dispatch_at_utc: clock.next_interval(now, interval),
                    buy_side_at_schedule: legs.target.is_some(),
                };
                self.scheduler.schedule_recheck(&check, now).await?;
                trail.advance(OrchestratorState::RecheckScheduled);
                Some(check.dispatch_at_utc)
            }
            _ => {
                trail.advance(OrchestratorState::Done);
                None
            }
        };

        Ok(PairTradeOutcome {
            states: trail.states,
            closed,
            opened,
            recheck_at,
        })
    }

    async fn close_leg(
        &self,
        venue: &dyn VenuePort,
        pair: &PairConfig,
        symbol: &Symbol,
        command: &PairTradeCommand,
        now: DateTime<Utc>,
        trail: &mut StateTrail,
    ) -> Result<Option<ClosedLeg>, TradingError> {
        let limit = self.settings.recent_order_limit;
        let history = venue.get_recent_closed_orders(symbol, limit).await?;
        if most_recent_fill_side(&history) != Some(OrderSide::Buy) {
            tracing::debug!(symbol = %symbol, "Closing leg already flat");
            return Ok(None);
        }

        let lookup = self
            .positions
            .read(venue, symbol, self.settings.position_retries)
            .await;
        let Some(held) = lookup.held_quantity() else {
            tracing::info!(symbol = %symbol, "No position to close");
            return Ok(None);
        };

        let increment = venue.get_symbol_increment(symbol).await?;
        let step = increment.step_for(OrderSide::Sell);
        let quantity = floor_to_step(held, step);
        if quantity <= Decimal::ZERO {
            return Err(TradingError::VenuePrecisionRejectable {
                computed: held,
                minimum: step,
            });
        }
        trail.advance(OrchestratorState::SizeComputed);

        let request = OrderRequest::market(symbol.clone(), OrderSide::Sell, OrderAmount::Quantity(quantity))
            .with_time_in_force(market_time_in_force(venue.exchange(), symbol));
        let confirmation = self.submit(venue, request).await?;
        trail.advance(OrchestratorState::OrderSubmitted);

        let mut after = venue.get_recent_closed_orders(symbol, limit).await?;
        if most_recent_fill_side(&after) != Some(OrderSide::Sell) {
            // The venue has not published the fill yet.
            let price = self
                .reference_price(venue, symbol, command, &confirmation)
                .await?;
            let filled = if confirmation.filled_qty > Decimal::ZERO {
                confirmation.filled_qty
            } else {
                quantity
            };
            after.insert(0, HistoricalOrder::at_price(OrderSide::Sell, filled, price, now));
        }
        let profit_loss = match_latest_disposal(&after)?.amount();

        let tax_reserved = self
            .settle_tax(venue, pair, symbol, profit_loss, command, now, trail)
            .await?;

        Ok(Some(ClosedLeg {
            symbol: symbol.clone(),
            quantity,
            profit_or_loss: profit_loss,
            tax_reserved,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    async fn settle_tax(
        &self,
        venue: &dyn VenuePort,
        pair: &PairConfig,
        symbol: &Symbol,
        profit_loss: Decimal,
        command: &PairTradeCommand,
        now: DateTime<Utc>,
        trail: &mut StateTrail,
    ) -> Result<Decimal, TradingError> {
        let tax = if command.reinvest_tax {
            Decimal::ZERO
        } else {
            tax_due(profit_loss, self.settings.tax_rate)
        };

        let reserve = pair
            .tax_reserve_symbol
            .as_ref()
            .filter(|_| tax > Decimal::ZERO);
        if let Some(reserve) = reserve {
            let amount = match venue.exchange() {
                Exchange::Alpaca => tax,
                Exchange::Binance => {
                    let increment = venue.get_symbol_increment(reserve).await?;
                    floor_to_step(tax, increment.step_for(OrderSide::Buy))
                }
            };
            let request = OrderRequest::market(reserve.clone(), OrderSide::Buy, OrderAmount::Notional(amount))
                .with_time_in_force(market_time_in_force(venue.exchange(), reserve));
            self.submit(venue, request).await?;
        }

        self.ledger
            .record_realized_trade(RealizedTrade {
                exchange: venue.exchange(),
                symbol: symbol.clone(),
                profit_or_loss: profit_loss,
                tax_reserved: tax,
                realized_at: now,
            })
            .await?;

        record_realized_trade(
            venue.exchange().as_str(),
            if profit_loss > Decimal::ZERO { "gain" } else { "loss" },
            tax > Decimal::ZERO,
        );
        tracing::info!(
            symbol = %symbol,
            profit_or_loss = %profit_loss,
            tax_reserved = %tax,
            "Realized trade recorded"
        );

        trail.advance(if tax > Decimal::ZERO {
            OrchestratorState::TaxSettled
        } else {
            OrchestratorState::TaxSkipped
        });
        Ok(tax)
    }

    async fn open_leg(
        &self,
        venue: &dyn VenuePort,
        symbol: &Symbol,
        command: &PairTradeCommand,
        now: DateTime<Utc>,
        trail: &mut StateTrail,
    ) -> Result<Option<OpenedLeg>, TradingError> {
        let history = venue
            .get_recent_closed_orders(symbol, self.settings.recent_order_limit)
            .await?;
        if most_recent_fill_side(&history) == Some(OrderSide::Buy) {
            tracing::info!(symbol = %symbol, "Target already held");
            return Ok(None);
        }

        let request = match venue.exchange() {
            Exchange::Alpaca => self.alpaca_entry(venue, symbol, command, now).await?,
            Exchange::Binance => self.binance_entry(venue, symbol, command, now).await?,
        };
        request.validate()?;
        trail.advance(OrchestratorState::SizeComputed);

        let amount = request.amount;
        let order_type = request.order_type;
        let confirmation = self.submit(venue, request).await?;
        trail.advance(OrchestratorState::OrderSubmitted);

        Ok(Some(OpenedLeg {
            symbol: symbol.clone(),
            amount,
            order_type,
            client_order_id: confirmation.client_order_id,
        }))
    }

    async fn alpaca_entry(
        &self,
        venue: &dyn VenuePort,
        symbol: &Symbol,
        command: &PairTradeCommand,
        now: DateTime<Utc>,
    ) -> Result<OrderRequest, TradingError> {
        let balance = BalanceReader
            .read(venue, self.ledger.as_ref(), symbol, command.reinvest_tax, now)
            .await?;
        let capital_percentage = self.capital_percentage(command);

        if symbol.is_crypto_pair() {
            let decision = size_by_equity(&EquitySizingInput {
                equity: balance.equity,
                cash: balance.cash,
                capital_percentage,
                fractionable: true,
                quote: Quote::default(),
            })?;
            return Ok(OrderRequest::market(symbol.clone(), OrderSide::Buy, decision.amount())
                .with_time_in_force(TimeInForce::Gtc));
        }

        let regular = MarketClock::for_symbol(Exchange::Alpaca, symbol, SessionSchedule::regular());
        let premarket = MarketClock::for_symbol(Exchange::Alpaca, symbol, SessionSchedule::premarket());
        if self.settings.premarket_trading && !regular.is_open(now) && premarket.is_open(now) {
            // Extended hours only accept whole-share limit orders.
            let limit_price = self.entry_limit_price(venue, symbol, command).await?;
            let decision = size_by_equity(&EquitySizingInput {
                equity: balance.equity,
                cash: balance.cash,
                capital_percentage,
                fractionable: false,
                quote: Quote::new(limit_price, limit_price, Decimal::ZERO, Decimal::ZERO),
            })?;
            return Ok(OrderRequest::limit(
                symbol.clone(),
                OrderSide::Buy,
                decision.amount().value(),
                limit_price,
            )
            .with_extended_hours());
        }

        let fractionable = venue.is_fractionable(symbol).await?;
        let quote = if fractionable {
            Quote::default()
        } else {
            self.quotes.resolve(venue, symbol).await?
        };
        let decision = size_by_equity(&EquitySizingInput {
            equity: balance.equity,
            cash: balance.cash,
            capital_percentage,
            fractionable,
            quote,
        })?;
        Ok(OrderRequest::market(symbol.clone(), OrderSide::Buy, decision.amount()))
    }

    async fn binance_entry(
        &self,
        venue: &dyn VenuePort,
        symbol: &Symbol,
        command: &PairTradeCommand,
        now: DateTime<Utc>,
    ) -> Result<OrderRequest, TradingError> {
        let balance = BalanceReader
            .read(venue, self.ledger.as_ref(), symbol, command.reinvest_tax, now)
            .await?;
        let increment = venue.get_symbol_increment(symbol).await?;
        let funds = size_by_balance(
            balance.cash,
            BalanceAllocation::Percentage(self.capital_percentage(command)),
            increment.step_for(OrderSide::Buy),
        )?;
        Ok(
            OrderRequest::market(symbol.clone(), OrderSide::Buy, OrderAmount::Notional(funds))
                .with_time_in_force(TimeInForce::Gtc),
        )
    }

    async fn queue_take_profit(
        &self,
        venue: &dyn VenuePort,
        account: AccountName,
        opened: &OpenedLeg,
        take_profit_pct: Decimal,
        command: &PairTradeCommand,
        now: DateTime<Utc>,
    ) -> Result<(), TradingError> {
        let entry_price = if opened.symbol == command.symbol {
            command.price
        } else {
            self.quotes.resolve(venue, &opened.symbol).await?.sizing_price()
        };

        self.take_profit_queue
            .enqueue(TakeProfitItem {
                exchange: venue.exchange(),
                account,
                symbol: opened.symbol.clone(),
                entry_price,
                take_profit_pct,
                queued_at: now,
            })
            .await?;

        let clock = MarketClock::for_symbol(venue.exchange(), &opened.symbol, SessionSchedule::regular());
        self.scheduler
            .schedule_take_profit(clock.next_session_open(now))
            .await?;
        Ok(())
    }

    async fn submit(
        &self,
        venue: &dyn VenuePort,
        request: OrderRequest,
    ) -> Result<OrderConfirmation, TradingError> {
        request.validate()?;
        let symbol = request.symbol.clone();
        let side = request.side;
        let order_type = request.order_type;
        let amount = request.amount;

        let confirmation = venue.submit_order(request).await?;

        record_order_submission(
            venue.exchange().as_str(),
            symbol.as_str(),
            side.as_str(),
            order_type.as_str(),
        );
        tracing::info!(
            symbol = %symbol,
            side = ?side,
            order_type = ?order_type,
            amount = ?amount,
            venue_order_id = %confirmation.venue_order_id,
            client_order_id = %confirmation.client_order_id,
            status = %confirmation.status,
            "Order submitted"
        );
        Ok(confirmation)
    }

    /// Price of `symbol` for bookkeeping when the venue did not report a fill.
    async fn reference_price(
        &self,
        venue: &dyn VenuePort,
        symbol: &Symbol,
        command: &PairTradeCommand,
        confirmation: &OrderConfirmation,
    ) -> Result<Decimal, TradingError> {
        if let Some(price) = confirmation.filled_avg_price {
            return Ok(price);
        }
        if symbol == &command.symbol {
            return Ok(command.price);
        }
        Ok(self.quotes.resolve(venue, symbol).await?.sizing_price())
    }

    /// Limit price for a premarket entry: the alert price on the alert's own
    /// symbol, otherwise the current quote.
    async fn entry_limit_price(
        &self,
        venue: &dyn VenuePort,
        symbol: &Symbol,
        command: &PairTradeCommand,
    ) -> Result<Decimal, TradingError> {
        let price = if symbol == &command.symbol {
            command.price
        } else {
            self.quotes.resolve(venue, symbol).await?.sizing_price()
        };
        Ok(price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    fn capital_percentage(&self, command: &PairTradeCommand) -> Decimal {
        command
            .capital_percentage
            .unwrap_or(self.settings.default_capital_percentage)
    }
}

/// Alpaca crypto orders must be GTC; everything else trades for the day.
fn market_time_in_force(exchange: Exchange, symbol: &Symbol) -> TimeInForce {
    match exchange {
        Exchange::Alpaca if !symbol.is_crypto_pair() => TimeInForce::Day,
        _ => TimeInForce::Gtc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::FixedTimeSource;
    use crate::application::testing::{
        RecordingDispatcher, ScriptedVenue, SingleVenueFactory, monday_premarket, monday_session,
        saturday_noon, selector,
    };
    use crate::domain::market::HistoricalOrder;
    use crate::domain::tax::FinancialYearStart;
    use crate::infrastructure::persistence::{InMemoryTakeProfitQueue, InMemoryTaxLedger};
    use chrono::TimeZone;
    use std::time::Duration;

    use OrchestratorState::*;

    struct Harness {
        venue: Arc<ScriptedVenue>,
        factory: Arc<SingleVenueFactory>,
        ledger: Arc<InMemoryTaxLedger>,
        queue: Arc<InMemoryTakeProfitQueue>,
        dispatcher: Arc<RecordingDispatcher>,
    }

    type UseCase = SubmitPairTradeUseCase<
        SingleVenueFactory,
        InMemoryTaxLedger,
        InMemoryTakeProfitQueue,
        RecordingDispatcher,
    >;

    impl Harness {
        fn new(venue: ScriptedVenue) -> Self {
            let venue = Arc::new(venue);
            Self {
                factory: Arc::new(SingleVenueFactory::new(venue.clone())),
                venue,
                ledger: Arc::new(InMemoryTaxLedger::new(FinancialYearStart::default())),
                queue: Arc::new(InMemoryTakeProfitQueue::new()),
                dispatcher: Arc::new(RecordingDispatcher::default()),
            }
        }

        fn use_case(&self, now: DateTime<Utc>, settings: TradingSettings) -> UseCase {
            SubmitPairTradeUseCase::new(
                self.factory.clone(),
                Arc::new(selector()),
                Arc::new(pairs()),
                self.ledger.clone(),
                self.queue.clone(),
                Arc::new(Scheduler::new(
                    self.dispatcher.clone(),
                    Some("https://trader.example.com".to_string()),
                )),
                Arc::new(FixedTimeSource(now)),
                settings,
            )
            .with_readers(QuoteResolver::default(), PositionReader::new(Duration::ZERO))
        }
    }

    fn pairs() -> PairBook {
        PairBook::new(vec![
            PairConfig {
                exchange: Exchange::Alpaca,
                long_symbol: Symbol::new("TQQQ"),
                inverse_symbol: Some(Symbol::new("SQQQ")),
                take_profit_pct: None,
                tax_reserve_symbol: Some(Symbol::new("SGOV")),
            },
            PairConfig {
                exchange: Exchange::Alpaca,
                long_symbol: Symbol::new("AAPL"),
                inverse_symbol: None,
                take_profit_pct: Some(dec!(0.05)),
                tax_reserve_symbol: None,
            },
            PairConfig {
                exchange: Exchange::Binance,
                long_symbol: Symbol::new("BTCUSDT"),
                inverse_symbol: None,
                take_profit_pct: None,
                tax_reserve_symbol: None,
            },
        ])
    }

    fn command(exchange: Exchange, symbol: &str, side: OrderSide, price: Decimal) -> PairTradeCommand {
        PairTradeCommand {
            exchange,
            symbol: Symbol::new(symbol),
            price,
            interval_minutes: Some(240),
            side,
            capital_percentage: Some(dec!(0.5)),
            reinvest_tax: false,
            schedule_recheck: false,
            account: None,
        }
    }

    fn bought(qty: Decimal, price: Decimal) -> HistoricalOrder {
        HistoricalOrder::at_price(OrderSide::Buy, qty, price, saturday_noon())
    }

    #[tokio::test]
    async fn open_only_buy_in_session_submits_notional_and_schedules_recheck() {
        let h = Harness::new(ScriptedVenue::new(Exchange::Alpaca));
        let mut cmd = command(Exchange::Alpaca, "TQQQ", OrderSide::Buy, dec!(60));
        cmd.schedule_recheck = true;

        let outcome = h
            .use_case(monday_session(), TradingSettings::default())
            .execute(cmd)
            .await
            .unwrap();

        assert_eq!(
            outcome.states,
            vec![Idle, CredentialsResolved, SizeComputed, OrderSubmitted, TaxSkipped, RecheckScheduled]
        );
        let submitted = h.venue.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].symbol, Symbol::new("TQQQ"));
        assert_eq!(submitted[0].amount, OrderAmount::Notional(dec!(5000)));
        assert_eq!(submitted[0].order_type, OrderType::Market);
        assert!(outcome.closed.is_none());
        // 11:00 New York on the 04:00 grid; next slot is 12:00.
        assert_eq!(outcome.recheck_at, Some(utc(17, 16, 0)));
        let dispatched = h.dispatcher.dispatched.lock().unwrap();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].delay_seconds, 3600);
    }

    fn utc(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, minute, 0).unwrap()
    }

    async fn recheck_for(
        exchange: Exchange,
        symbol: &str,
        now: DateTime<Utc>,
        settings: TradingSettings,
    ) -> (Option<DateTime<Utc>>, u64, serde_json::Value) {
        let h = Harness::new(ScriptedVenue::new(exchange).with_increment(dec!(0.00001), dec!(0.01)));
        let mut cmd = command(exchange, symbol, OrderSide::Buy, dec!(60));
        cmd.schedule_recheck = true;

        let outcome = h.use_case(now, settings).execute(cmd).await.unwrap();

        let dispatched = h.dispatcher.dispatched.lock().unwrap();
        assert_eq!(dispatched.len(), 1);
        (
            outcome.recheck_at,
            dispatched[0].delay_seconds,
            dispatched[0].payload.clone(),
        )
    }

    #[tokio::test]
    async fn premarket_alert_rechecks_on_four_am_grid() {
        // 08:00 New York with a 240 minute chart: 04:00, 08:00, 12:00.
        let (at, delay, payload) = recheck_for(
            Exchange::Alpaca,
            "TQQQ",
            monday_premarket(),
            TradingSettings::default(),
        )
        .await;

        assert_eq!(at, Some(utc(17, 16, 0)));
        assert_eq!(delay, 4 * 3600);
        assert_eq!(payload["dispatchAtUtc"], "2024-06-17T16:00:00Z");
        assert_eq!(payload["buySideAtSchedule"], true);
    }

    #[tokio::test]
    async fn evening_alert_rechecks_after_next_open() {
        // 20:00 New York; every slot today has passed, so 04:15 tomorrow.
        let (at, delay, _) = recheck_for(
            Exchange::Alpaca,
            "TQQQ",
            utc(18, 0, 0),
            TradingSettings::default(),
        )
        .await;

        assert_eq!(at, Some(utc(18, 8, 15)));
        assert_eq!(delay, 8 * 3600 + 15 * 60);
    }

    #[tokio::test]
    async fn without_premarket_rechecks_follow_regular_session() {
        let settings = TradingSettings {
            premarket_trading: false,
            ..TradingSettings::default()
        };
        let (at, delay, _) =
            recheck_for(Exchange::Alpaca, "TQQQ", monday_premarket(), settings).await;

        // 09:30 New York.
        assert_eq!(at, Some(utc(17, 13, 30)));
        assert_eq!(delay, 90 * 60);
    }

    #[tokio::test]
    async fn binance_rechecks_on_utc_midnight_grid() {
        let (at, delay, payload) = recheck_for(
            Exchange::Binance,
            "BTCUSDT",
            saturday_noon(),
            TradingSettings::default(),
        )
        .await;

        assert_eq!(at, Some(utc(15, 16, 0)));
        assert_eq!(delay, 4 * 3600);
        assert_eq!(payload["exchange"], "binance");
    }

    #[tokio::test]
    async fn flip_with_gain_closes_reserves_tax_then_opens() {
        let venue = ScriptedVenue::new(Exchange::Alpaca)
            .with_position("SQQQ", dec!(10))
            .with_history("SQQQ", vec![bought(dec!(10), dec!(20))])
            .with_fill_price("SQQQ", dec!(25));
        let h = Harness::new(venue);

        let outcome = h
            .use_case(monday_session(), TradingSettings::default())
            .execute(command(Exchange::Alpaca, "TQQQ", OrderSide::Buy, dec!(60)))
            .await
            .unwrap();

        assert_eq!(
            outcome.states,
            vec![
                Idle,
                CredentialsResolved,
                SizeComputed,
                OrderSubmitted,
                TaxSettled,
                SizeComputed,
                OrderSubmitted,
                Done
            ]
        );
        let closed = outcome.closed.unwrap();
        assert_eq!(closed.profit_or_loss, dec!(50));
        assert_eq!(closed.tax_reserved, dec!(10));

        let submitted = h.venue.submitted();
        let symbols: Vec<_> = submitted.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SQQQ", "SGOV", "TQQQ"]);
        assert_eq!(submitted[0].amount, OrderAmount::Quantity(dec!(10)));
        assert_eq!(submitted[1].amount, OrderAmount::Notional(dec!(10)));
        // Opening capital is net of the tax just reserved.
        assert_eq!(submitted[2].amount, OrderAmount::Notional(dec!(4995)));

        assert_eq!(
            h.ledger.outstanding_tax(monday_session()).await.unwrap(),
            dec!(10)
        );
    }

    #[tokio::test]
    async fn realized_loss_skips_tax() {
        let venue = ScriptedVenue::new(Exchange::Alpaca)
            .with_position("SQQQ", dec!(10))
            .with_history("SQQQ", vec![bought(dec!(10), dec!(20))])
            .with_fill_price("SQQQ", dec!(18));
        let h = Harness::new(venue);

        let outcome = h
            .use_case(monday_session(), TradingSettings::default())
            .execute(command(Exchange::Alpaca, "TQQQ", OrderSide::Buy, dec!(60)))
            .await
            .unwrap();

        assert!(outcome.states.contains(&TaxSkipped));
        assert_eq!(outcome.closed.unwrap().profit_or_loss, dec!(-20));
        let symbols: Vec<_> = h
            .venue
            .submitted()
            .iter()
            .map(|o| o.symbol.to_string())
            .collect();
        assert_eq!(symbols, vec!["SQQQ", "TQQQ"]);
        assert_eq!(
            h.ledger.outstanding_tax(monday_session()).await.unwrap(),
            Decimal::ZERO
        );
    }

    #[tokio::test]
    async fn reinvest_tax_records_zero_reserve() {
        let venue = ScriptedVenue::new(Exchange::Alpaca)
            .with_position("SQQQ", dec!(10))
            .with_history("SQQQ", vec![bought(dec!(10), dec!(20))])
            .with_fill_price("SQQQ", dec!(25));
        let h = Harness::new(venue);
        let mut cmd = command(Exchange::Alpaca, "TQQQ", OrderSide::Buy, dec!(60));
        cmd.reinvest_tax = true;

        let outcome = h
            .use_case(monday_session(), TradingSettings::default())
            .execute(cmd)
            .await
            .unwrap();

        assert!(outcome.states.contains(&TaxSkipped));
        assert_eq!(outcome.closed.unwrap().tax_reserved, Decimal::ZERO);
        assert_eq!(h.venue.submitted().len(), 2);
    }

    #[tokio::test]
    async fn unpublished_fill_uses_alert_price() {
        let venue = ScriptedVenue::new(Exchange::Alpaca)
            .with_position("AAPL", dec!(10))
            .with_history("AAPL", vec![bought(dec!(10), dec!(20))]);
        let h = Harness::new(venue);

        let outcome = h
            .use_case(monday_session(), TradingSettings::default())
            .execute(command(Exchange::Alpaca, "AAPL", OrderSide::Sell, dec!(30)))
            .await
            .unwrap();

        let closed = outcome.closed.unwrap();
        assert_eq!(closed.profit_or_loss, dec!(100));
        assert_eq!(closed.tax_reserved, dec!(20));
        assert!(outcome.opened.is_none());
    }

    #[tokio::test]
    async fn insufficient_history_aborts_after_close() {
        let venue = ScriptedVenue::new(Exchange::Alpaca)
            .with_position("AAPL", dec!(10))
            .with_history("AAPL", vec![bought(dec!(5), dec!(20))])
            .with_fill_price("AAPL", dec!(30));
        let h = Harness::new(venue);

        let err = h
            .use_case(monday_session(), TradingSettings::default())
            .execute(command(Exchange::Alpaca, "AAPL", OrderSide::Sell, dec!(30)))
            .await
            .unwrap_err();

        assert!(matches!(err, TradingError::InsufficientMatchingHistory { .. }));
        assert_eq!(h.venue.submitted().len(), 1);
    }

    #[tokio::test]
    async fn non_fractionable_asset_buys_whole_shares() {
        let venue = ScriptedVenue::new(Exchange::Alpaca)
            .with_balance(dec!(1000), dec!(5000))
            .with_fractionable(false)
            .with_quotes(vec![Ok(Quote::new(dec!(98), dec!(97), dec!(1), dec!(1)))]);
        let h = Harness::new(venue);
        let mut cmd = command(Exchange::Alpaca, "TQQQ", OrderSide::Buy, dec!(97));
        cmd.capital_percentage = Some(dec!(0.97));

        h.use_case(monday_session(), TradingSettings::default())
            .execute(cmd)
            .await
            .unwrap();

        let submitted = h.venue.submitted();
        assert_eq!(submitted[0].amount, OrderAmount::Quantity(dec!(9)));
        assert_eq!(submitted[0].order_type, OrderType::Market);
    }

    #[tokio::test]
    async fn premarket_entry_is_whole_share_limit_at_alert_price() {
        let venue = ScriptedVenue::new(Exchange::Alpaca).with_balance(dec!(1000), dec!(1000));
        let h = Harness::new(venue);

        h.use_case(monday_premarket(), TradingSettings::default())
            .execute(command(Exchange::Alpaca, "TQQQ", OrderSide::Buy, dec!(50)))
            .await
            .unwrap();

        let order = &h.venue.submitted()[0];
        assert_eq!(order.order_type, OrderType::Limit);
        assert_eq!(order.limit_price, Some(dec!(50)));
        assert_eq!(order.amount, OrderAmount::Quantity(dec!(9)));
        assert!(order.extended_hours);
    }

    #[tokio::test]
    async fn binance_buy_uses_quote_balance_and_increment() {
        let venue = ScriptedVenue::new(Exchange::Binance)
            .with_balance(dec!(1000.5), dec!(1000.5))
            .with_increment(dec!(0.00001), dec!(0.01));
        let h = Harness::new(venue);

        h.use_case(saturday_noon(), TradingSettings::default())
            .execute(command(Exchange::Binance, "BTCUSDT", OrderSide::Buy, dec!(65000)))
            .await
            .unwrap();

        let order = &h.venue.submitted()[0];
        assert_eq!(order.amount, OrderAmount::Notional(dec!(500.25)));
        assert_eq!(order.time_in_force, TimeInForce::Gtc);
    }

    #[tokio::test]
    async fn held_target_is_not_bought_again() {
        let venue = ScriptedVenue::new(Exchange::Alpaca)
            .with_history("TQQQ", vec![bought(dec!(3), dec!(60))]);
        let h = Harness::new(venue);

        let outcome = h
            .use_case(monday_session(), TradingSettings::default())
            .execute(command(Exchange::Alpaca, "TQQQ", OrderSide::Buy, dec!(60)))
            .await
            .unwrap();

        assert_eq!(outcome.states, vec![Idle, CredentialsResolved, Done]);
        assert!(h.venue.submitted().is_empty());
    }

    #[tokio::test]
    async fn unknown_pair_is_rejected_before_any_venue_call() {
        let h = Harness::new(ScriptedVenue::new(Exchange::Alpaca));

        let err = h
            .use_case(monday_session(), TradingSettings::default())
            .execute(command(Exchange::Alpaca, "SPY", OrderSide::Buy, dec!(500)))
            .await
            .unwrap_err();

        assert!(matches!(err, TradingError::UnknownPair { .. }));
        assert!(h.factory.connections.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dev_mode_routes_to_paper_account() {
        let h = Harness::new(ScriptedVenue::new(Exchange::Alpaca));
        let settings = TradingSettings {
            dev_mode: DevelopmentMode(true),
            ..TradingSettings::default()
        };

        h.use_case(monday_session(), settings)
            .execute(command(Exchange::Alpaca, "TQQQ", OrderSide::Buy, dec!(60)))
            .await
            .unwrap();

        assert_eq!(
            *h.factory.connections.lock().unwrap(),
            vec![(Exchange::Alpaca, true)]
        );
    }

    #[tokio::test]
    async fn take_profit_pair_queues_item_and_cron() {
        let h = Harness::new(ScriptedVenue::new(Exchange::Alpaca));

        h.use_case(monday_session(), TradingSettings::default())
            .execute(command(Exchange::Alpaca, "AAPL", OrderSide::Buy, dec!(200)))
            .await
            .unwrap();

        assert_eq!(h.queue.remaining().await.unwrap(), 1);
        let crons = h.dispatcher.crons.lock().unwrap();
        assert_eq!(crons.len(), 1);
        // Tuesday 18 June 2024, 09:30 New York.
        assert_eq!(crons[0].cron.as_str(), "30 13 18 6 *");
    }

    #[tokio::test]
    async fn rejected_order_propagates() {
        let venue = ScriptedVenue::new(Exchange::Alpaca);
        *venue.reject_orders.lock().unwrap() = true;
        let h = Harness::new(venue);
        let mut cmd = command(Exchange::Alpaca, "TQQQ", OrderSide::Buy, dec!(60));
        cmd.schedule_recheck = true;

        let err = h
            .use_case(monday_session(), TradingSettings::default())
            .execute(cmd)
            .await
            .unwrap_err();

        assert!(matches!(err, TradingError::Venue(_)));
        assert!(h.dispatcher.dispatched.lock().unwrap().is_empty());
    }
}
