//! Fixed daily session in a named timezone.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use super::NEXT_DAY_SETTLEMENT_MINUTES;
use super::session::SessionSchedule;

/// Clock for markets with fixed local trading hours.
#[derive(Debug, Clone)]
pub struct FixedSessionClock<Z: TimeZone> {
    tz: Z,
    schedule: SessionSchedule,
}

impl FixedSessionClock<Tz> {
    /// US equity clock in `America/New_York`.
    #[must_use]
    pub const fn new_york(schedule: SessionSchedule) -> Self {
        Self::new(chrono_tz::America::New_York, schedule)
    }
}

impl<Z: TimeZone> FixedSessionClock<Z> {
    /// Create a clock for `schedule` in `tz`.
    #[must_use]
    pub const fn new(tz: Z, schedule: SessionSchedule) -> Self {
        Self { tz, schedule }
    }

    /// Whether `now` falls inside a weekday session.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.tz);
        if is_weekend(local.weekday()) {
            return false;
        }
        self.schedule.contains(local.hour() * 60 + local.minute())
    }

    /// Walk `open, open + interval, ...` inside `[open, close)` of the local
    /// day containing `now` and return the first slot strictly after `now`.
    ///
    /// Once the day is exhausted the next calendar day's open plus the
    /// settlement delay is returned. Weekends are not skipped here.
    #[must_use]
    pub fn next_interval(&self, now: DateTime<Utc>, interval_minutes: u32) -> DateTime<Utc> {
        let step = TimeDelta::minutes(i64::from(interval_minutes.max(1)));
        let today = now.with_timezone(&self.tz).date_naive();

        let close = self.local_instant(today, i64::from(self.schedule.close_minutes));
        let mut candidate = self.local_instant(today, i64::from(self.schedule.open_minutes));
        while candidate < close {
            if candidate > now {
                return candidate;
            }
            candidate += step;
        }

        let tomorrow = today.succ_opt().unwrap_or(today);
        self.local_instant(
            tomorrow,
            i64::from(self.schedule.open_minutes) + NEXT_DAY_SETTLEMENT_MINUTES,
        )
    }

    /// Next weekday session open strictly after `now`.
    #[must_use]
    pub fn next_session_open(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut date = now.with_timezone(&self.tz).date_naive();
        let open_minutes = i64::from(self.schedule.open_minutes);

        // A week always contains a weekday whose open is in the future.
        for _ in 0..8 {
            if !is_weekend(date.weekday()) {
                let open = self.local_instant(date, open_minutes);
                if open > now {
                    return open;
                }
            }
            date = date.succ_opt().unwrap_or(date);
        }
        self.local_instant(date, open_minutes)
    }

    /// UTC instant of a local minute offset on `date`.
    ///
    /// Ambiguous wall times resolve to the earlier instant; wall times inside
    /// a DST gap shift forward by an hour.
    fn local_instant(&self, date: NaiveDate, minutes: i64) -> DateTime<Utc> {
        let naive = date.and_time(NaiveTime::MIN) + TimeDelta::minutes(minutes);
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                self.tz
                    .from_local_datetime(&(naive + TimeDelta::hours(1)))
                    .earliest()
            })
            .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc))
    }
}

const fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}
