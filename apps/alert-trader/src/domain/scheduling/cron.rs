//! One-shot cron expressions.

use std::fmt;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Five-field cron expression pinned to a single UTC minute of the year.
///
/// The weekday field is a wildcard, so the schedule fires again a year later
/// unless the dispatcher deletes it after the first run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CronExpression(String);

impl CronExpression {
    /// `"{minute} {hour} {day} {month} *"` for `instant`.
    #[must_use]
    pub fn one_shot(instant: DateTime<Utc>) -> Self {
        Self(format!(
            "{} {} {} {} *",
            instant.minute(),
            instant.hour(),
            instant.day(),
            instant.month()
        ))
    }

    /// Expression text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    #[test]
    fn formats_utc_fields() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 17, 13, 30, 0).unwrap();
        assert_eq!(CronExpression::one_shot(instant).as_str(), "30 13 17 6 *");
    }

    #[test]
    fn converts_local_open_to_utc() {
        // 09:30 New York on a winter day is 14:30 UTC.
        let open = New_York
            .with_ymd_and_hms(2024, 1, 8, 9, 30, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(CronExpression::one_shot(open).to_string(), "30 14 8 1 *");
    }
}
