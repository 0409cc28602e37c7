//! Follow-up position checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::accounts::AccountName;
use crate::domain::shared::{Exchange, Symbol};
use crate::error::TradingError;

/// A recheck created at order time and consumed once when dispatched back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledCheck {
    /// Symbol whose position is checked.
    pub target_symbol: Symbol,
    /// Venue holding the position.
    pub exchange: Exchange,
    /// Account the order was placed with.
    #[serde(default)]
    pub account: AccountName,
    /// When the dispatcher should deliver the check.
    pub dispatch_at_utc: DateTime<Utc>,
    /// Whether the position was being bought when the check was scheduled.
    pub buy_side_at_schedule: bool,
}

/// Whole seconds from `now` until `next`.
///
/// A negative delay means the caller computed an instant in the past, which
/// is a logic fault rather than something to schedule.
pub fn delay_until(next: DateTime<Utc>, now: DateTime<Utc>) -> Result<u64, TradingError> {
    if next < now {
        return Err(TradingError::SchedulingInThePast { target: next, now });
    }
    u64::try_from((next - now).num_seconds())
        .map_err(|_| TradingError::SchedulingInThePast { target: next, now })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn delay_in_whole_seconds() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let next = now + Duration::minutes(15) + Duration::milliseconds(900);
        assert_eq!(delay_until(next, now).unwrap(), 900);
        assert_eq!(delay_until(now, now).unwrap(), 0);
    }

    #[test]
    fn past_instant_fails_fast() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let err = delay_until(now - Duration::seconds(1), now).unwrap_err();
        assert!(matches!(err, TradingError::SchedulingInThePast { .. }));
    }

    #[test]
    fn sub_second_past_instant_is_not_rounded_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let err = delay_until(now - Duration::milliseconds(400), now).unwrap_err();
        assert!(matches!(err, TradingError::SchedulingInThePast { .. }));
    }

    #[test]
    fn payload_round_trips_as_camel_case() {
        let check = ScheduledCheck {
            target_symbol: Symbol::new("TQQQ"),
            exchange: Exchange::Alpaca,
            account: AccountName::Paper,
            dispatch_at_utc: Utc.with_ymd_and_hms(2024, 6, 15, 16, 0, 0).unwrap(),
            buy_side_at_schedule: true,
        };
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["targetSymbol"], "TQQQ");
        assert_eq!(json["buySideAtSchedule"], true);
        assert_eq!(json["account"], "paper");
    }
}
