//! Market Clock
//!
//! Session windows for fixed-hours equity markets and the 24/7 grid used by
//! crypto venues. Both clocks answer three questions: is the market open, when
//! is the next interval boundary worth re-evaluating, and when does the next
//! session open.
//!
//! Holiday calendars are not modelled; only weekends are skipped.

mod always_open;
mod fixed_session;
mod session;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub use always_open::AlwaysOpenClock;
pub use fixed_session::FixedSessionClock;
pub use session::SessionSchedule;

use crate::domain::shared::{Exchange, Symbol};

/// Minutes after the session start used as the next-day anchor once today's
/// slots are exhausted.
pub const NEXT_DAY_SETTLEMENT_MINUTES: i64 = 15;

/// Clock selected for a venue and symbol.
#[derive(Debug, Clone)]
pub enum MarketClock {
    /// Fixed daily session in a named timezone.
    Session(FixedSessionClock<Tz>),
    /// Round-the-clock market.
    AlwaysOpen(AlwaysOpenClock),
}

impl MarketClock {
    /// Pick the clock for a symbol: Alpaca equities follow the New York
    /// session, everything else trades around the clock.
    #[must_use]
    pub fn for_symbol(exchange: Exchange, symbol: &Symbol, schedule: SessionSchedule) -> Self {
        match exchange {
            Exchange::Alpaca if !symbol.is_crypto_pair() => {
                Self::Session(FixedSessionClock::new_york(schedule))
            }
            Exchange::Alpaca | Exchange::Binance => Self::AlwaysOpen(AlwaysOpenClock),
        }
    }

    /// Whether the market is open at `now`.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Session(clock) => clock.is_open(now),
            Self::AlwaysOpen(clock) => clock.is_open(now),
        }
    }

    /// First interval boundary strictly after `now`.
    #[must_use]
    pub fn next_interval(&self, now: DateTime<Utc>, interval_minutes: u32) -> DateTime<Utc> {
        match self {
            Self::Session(clock) => clock.next_interval(now, interval_minutes),
            Self::AlwaysOpen(clock) => clock.next_interval(now, interval_minutes),
        }
    }

    /// Next session open strictly after `now`.
    #[must_use]
    pub fn next_session_open(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Session(clock) => clock.next_session_open(now),
            Self::AlwaysOpen(clock) => clock.next_session_open(now),
        }
    }

    /// Whether this clock never closes.
    #[must_use]
    pub const fn is_always_open(&self) -> bool {
        matches!(self, Self::AlwaysOpen(_))
    }
}
