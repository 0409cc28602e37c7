//! Tax reservation on realized gains.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Tax reserved against a realized result; losses and break-evens reserve nothing.
#[must_use]
pub fn tax_due(realized: Decimal, rate: Decimal) -> Decimal {
    if realized <= Decimal::ZERO || rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (realized * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// First day of the financial year, as month and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialYearStart {
    /// Month, 1-12.
    pub month: u32,
    /// Day of month.
    pub day: u32,
}

impl Default for FinancialYearStart {
    /// 6 April.
    fn default() -> Self {
        Self { month: 4, day: 6 }
    }
}

impl FinancialYearStart {
    /// Whether the month/day pair exists in every year (29 February does not).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        NaiveDate::from_ymd_opt(2023, self.month, self.day).is_some()
    }

    /// Start instant (UTC midnight) of the financial year containing `at`.
    #[must_use]
    pub fn year_containing(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let date = at.date_naive();
        let start_in = |year: i32| {
            NaiveDate::from_ymd_opt(year, self.month, self.day)
                .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
                .unwrap_or(date)
        };
        let this_year = start_in(date.year());
        let start = if date >= this_year {
            this_year
        } else {
            start_in(date.year() - 1)
        };
        start.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn gains_reserve_rounded_tax() {
        assert_eq!(tax_due(dec!(240), dec!(0.2)), dec!(48));
        assert_eq!(tax_due(dec!(10.005), dec!(0.5)), dec!(5.00));
        assert_eq!(tax_due(dec!(0.05), dec!(0.45)), dec!(0.02));
    }

    #[test]
    fn losses_reserve_nothing() {
        assert_eq!(tax_due(dec!(-50), dec!(0.2)), Decimal::ZERO);
        assert_eq!(tax_due(Decimal::ZERO, dec!(0.2)), Decimal::ZERO);
    }

    #[test]
    fn financial_year_boundaries() {
        let fy = FinancialYearStart::default();
        let before = Utc.with_ymd_and_hms(2024, 4, 5, 23, 0, 0).unwrap();
        let on = Utc.with_ymd_and_hms(2024, 4, 6, 0, 0, 0).unwrap();
        assert_eq!(
            fy.year_containing(before),
            Utc.with_ymd_and_hms(2023, 4, 6, 0, 0, 0).unwrap()
        );
        assert_eq!(fy.year_containing(on), on);
    }

    #[test]
    fn leap_day_start_is_invalid() {
        assert!(!FinancialYearStart { month: 2, day: 29 }.is_valid());
        assert!(FinancialYearStart { month: 1, day: 1 }.is_valid());
    }
}
