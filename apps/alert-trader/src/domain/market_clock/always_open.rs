//! Round-the-clock market grid.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

/// Clock for venues that never close; slots are aligned to UTC midnight.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOpenClock;

impl AlwaysOpenClock {
    /// Always true.
    #[must_use]
    pub const fn is_open(&self, _now: DateTime<Utc>) -> bool {
        true
    }

    /// First slot of `[00:00, 24:00)` strictly after `now`, else next midnight.
    #[must_use]
    pub fn next_interval(&self, now: DateTime<Utc>, interval_minutes: u32) -> DateTime<Utc> {
        let step = TimeDelta::minutes(i64::from(interval_minutes.max(1)));
        let midnight = Self::midnight(now);
        let end = midnight + TimeDelta::days(1);

        let mut candidate = midnight;
        while candidate < end {
            if candidate > now {
                return candidate;
            }
            candidate += step;
        }
        end
    }

    /// The next UTC midnight.
    #[must_use]
    pub fn next_session_open(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Self::midnight(now) + TimeDelta::days(1)
    }

    fn midnight(now: DateTime<Utc>) -> DateTime<Utc> {
        now.date_naive().and_time(NaiveTime::MIN).and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, m, 0).unwrap()
    }

    #[test]
    fn walks_from_midnight() {
        let clock = AlwaysOpenClock;
        assert_eq!(clock.next_interval(utc(15, 8, 0), 240), utc(15, 12, 0));
        assert_eq!(clock.next_interval(utc(15, 8, 1), 240), utc(15, 12, 0));
        assert_eq!(clock.next_interval(utc(15, 0, 0), 60), utc(15, 1, 0));
    }

    #[test]
    fn rolls_to_next_midnight() {
        let clock = AlwaysOpenClock;
        assert_eq!(clock.next_interval(utc(15, 20, 0), 240), utc(16, 0, 0));
        // 7 * 210 minutes = 24:30, so the last slot is 21:00.
        assert_eq!(clock.next_interval(utc(15, 21, 0), 210), utc(16, 0, 0));
    }

    #[test]
    fn always_open_and_next_session_is_midnight() {
        let clock = AlwaysOpenClock;
        assert!(clock.is_open(utc(15, 3, 0)));
        assert_eq!(clock.next_session_open(utc(15, 3, 0)), utc(16, 0, 0));
    }
}
