//! Take-Profit Use Case
//!
//! Works through the take-profit queue one item per invocation: the oldest
//! item gets a GTC limit sell at its target price, and the next invocation is
//! scheduled for the following session open while items remain.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::application::ports::{DispatcherPort, TakeProfitQueuePort, TimeSource, VenueFactory};
use crate::application::services::{PositionReader, Scheduler};
use crate::domain::accounts::{CredentialSelector, DevelopmentMode};
use crate::domain::market::OrderRequest;
use crate::domain::market_clock::{MarketClock, SessionSchedule};
use crate::domain::shared::{OrderSide, OrderType, Symbol, TimeInForce};
use crate::domain::sizing::floor_to_step;
use crate::error::TradingError;
use crate::observability::record_order_submission;

/// Limit sell placed for a queued item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TakeProfitOrder {
    /// Symbol sold.
    pub symbol: Symbol,
    /// Whole position, floored to the venue increment.
    pub quantity: Decimal,
    /// Limit price.
    pub limit_price: Decimal,
    /// Client order ID.
    pub client_order_id: String,
    /// Items left in the queue.
    pub remaining: usize,
}

/// Use case for draining the take-profit queue.
pub struct TakeProfitUseCase<F, Q, D>
where
    F: VenueFactory,
    Q: TakeProfitQueuePort,
    D: DispatcherPort,
{
    venues: Arc<F>,
    selector: Arc<CredentialSelector>,
    queue: Arc<Q>,
    scheduler: Arc<Scheduler<D>>,
    time: Arc<dyn TimeSource>,
    dev_mode: DevelopmentMode,
    positions: PositionReader,
    position_retries: u32,
}

impl<F, Q, D> TakeProfitUseCase<F, Q, D>
where
    F: VenueFactory,
    Q: TakeProfitQueuePort,
    D: DispatcherPort,
{
    /// Create a new `TakeProfitUseCase`.
    pub fn new(
        venues: Arc<F>,
        selector: Arc<CredentialSelector>,
        queue: Arc<Q>,
        scheduler: Arc<Scheduler<D>>,
        time: Arc<dyn TimeSource>,
        dev_mode: DevelopmentMode,
    ) -> Self {
        Self {
            venues,
            selector,
            queue,
            scheduler,
            time,
            dev_mode,
            positions: PositionReader::default(),
            position_retries: 2,
        }
    }

    /// Replace the position reader and its retry count.
    #[must_use]
    pub const fn with_position_reader(mut self, positions: PositionReader, retries: u32) -> Self {
        self.positions = positions;
        self.position_retries = retries;
        self
    }

    /// Place the take-profit order for the oldest queued item.
    ///
    /// Returns `None` when the queue is empty. The item is consumed even when
    /// a later step fails.
    pub async fn execute_next(&self) -> Result<Option<TakeProfitOrder>, TradingError> {
        let Some(item) = self.queue.pop_next().await? else {
            tracing::info!("Take-profit queue empty");
            return Ok(None);
        };

        let credentials = self
            .selector
            .select(item.exchange, Some(item.account), self.dev_mode)?;
        let venue = self.venues.connect(item.exchange, credentials)?;

        let position = self
            .positions
            .read(venue.as_ref(), &item.symbol, self.position_retries)
            .await
            .require()?;

        let increment = venue.get_symbol_increment(&item.symbol).await?;
        let step = increment.step_for(OrderSide::Sell);
        let quantity = floor_to_step(position.quantity_held, step);
        if quantity <= Decimal::ZERO {
            return Err(TradingError::VenuePrecisionRejectable {
                computed: position.quantity_held,
                minimum: step,
            });
        }

        let limit_price = Decimal::ONE
            .checked_add(item.take_profit_pct)
            .and_then(|factor| item.entry_price.checked_mul(factor))
            .ok_or_else(|| {
                TradingError::InvalidOrder(format!(
                    "take-profit price overflows for entry {} at {}",
                    item.entry_price, item.take_profit_pct
                ))
            })?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let request = OrderRequest::limit(item.symbol.clone(), OrderSide::Sell, quantity, limit_price)
            .with_time_in_force(TimeInForce::Gtc);
        request.validate()?;

        let confirmation = venue.submit_order(request).await?;
        record_order_submission(
            item.exchange.as_str(),
            item.symbol.as_str(),
            OrderSide::Sell.as_str(),
            OrderType::Limit.as_str(),
        );
        tracing::info!(
            symbol = %item.symbol,
            quantity = %quantity,
            limit_price = %limit_price,
            entry_price = %item.entry_price,
            client_order_id = %confirmation.client_order_id,
            "Take-profit order submitted"
        );

        let remaining = self.queue.remaining().await?;
        if remaining > 0 {
            let now = self.time.now();
            let clock = MarketClock::for_symbol(item.exchange, &item.symbol, SessionSchedule::regular());
            self.scheduler
                .schedule_take_profit(clock.next_session_open(now))
                .await?;
        }

        Ok(Some(TakeProfitOrder {
            symbol: item.symbol,
            quantity,
            limit_price,
            client_order_id: confirmation.client_order_id,
            remaining,
        }))
    }
}
