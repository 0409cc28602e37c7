//! Session window definitions.

use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Daily session window as minute offsets from local midnight, `[open, close)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSchedule {
    /// Session open, minutes after local midnight.
    pub open_minutes: u32,
    /// Session close, minutes after local midnight (exclusive).
    pub close_minutes: u32,
}

impl SessionSchedule {
    /// Build a window; the close is clamped to the end of the day.
    #[must_use]
    pub fn new(open_minutes: u32, close_minutes: u32) -> Self {
        Self {
            open_minutes,
            close_minutes: close_minutes.min(MINUTES_PER_DAY),
        }
    }

    /// Regular US equity session, 09:30 to 16:00.
    #[must_use]
    pub const fn regular() -> Self {
        Self {
            open_minutes: 9 * 60 + 30,
            close_minutes: 16 * 60,
        }
    }

    /// Session including premarket, 04:00 to 16:00.
    #[must_use]
    pub const fn premarket() -> Self {
        Self {
            open_minutes: 4 * 60,
            close_minutes: 16 * 60,
        }
    }

    /// Whether a minute-of-day offset falls inside the window.
    #[must_use]
    pub const fn contains(&self, minute_of_day: u32) -> bool {
        minute_of_day >= self.open_minutes && minute_of_day < self.close_minutes
    }
}

impl Default for SessionSchedule {
    fn default() -> Self {
        Self::regular()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_is_exclusive() {
        let schedule = SessionSchedule::regular();
        assert!(schedule.contains(570));
        assert!(schedule.contains(959));
        assert!(!schedule.contains(960));
        assert!(!schedule.contains(569));
    }

    #[test]
    fn premarket_opens_at_four() {
        assert_eq!(SessionSchedule::premarket().open_minutes, 240);
        assert_eq!(SessionSchedule::new(0, 5000).close_minutes, 1440);
    }
}
