//! Date arithmetic for year-offset comparisons.

use chrono::{Datelike, Days, NaiveDate};

/// The fixed offsets shown in the comparison report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearOffset {
    /// 365 days before today.
    LastYear,
    /// Same calendar day 10 years before.
    TenYears,
    /// Same calendar day 20 years before.
    TwentyYears,
    /// Same calendar day 30 years before.
    ThirtyYears,
    /// Same calendar day 40 years before.
    FortyYears,
}

impl YearOffset {
    /// Day this offset refers to, counted back from `today`.
    ///
    /// `LastYear` subtracts a fixed 365 days, so it lands one day later
    /// than the calendar date whenever a 29 February lies in between. The
    /// other offsets subtract calendar years.
    #[must_use]
    pub fn target_date(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::LastYear => days_before(today, 365),
            Self::TenYears => years_before(today, 10),
            Self::TwentyYears => years_before(today, 20),
            Self::ThirtyYears => years_before(today, 30),
            Self::FortyYears => years_before(today, 40),
        }
    }
}

/// Same month and day `years` calendar years before `date`.
///
/// 29 February maps to 28 February when the target year is not a leap year.
#[must_use]
pub fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    let year = date.year() - i32::try_from(years).unwrap_or(i32::MAX);
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(date)
}

/// `days` days before `date`, saturating at the earliest representable
/// date.
#[must_use]
pub fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn last_year_uses_fixed_365_days() {
        // 2024 is a leap year, so 365 days back lands on the 16th.
        assert_eq!(
            YearOffset::LastYear.target_date(ymd(2024, 7, 15)),
            ymd(2023, 7, 16)
        );
        assert_eq!(
            YearOffset::LastYear.target_date(ymd(2023, 7, 15)),
            ymd(2022, 7, 15)
        );
    }

    #[test]
    fn decade_offsets_use_calendar_years() {
        let today = ymd(2024, 7, 15);
        assert_eq!(YearOffset::TenYears.target_date(today), ymd(2014, 7, 15));
        assert_eq!(YearOffset::TwentyYears.target_date(today), ymd(2004, 7, 15));
        assert_eq!(YearOffset::ThirtyYears.target_date(today), ymd(1994, 7, 15));
        assert_eq!(YearOffset::FortyYears.target_date(today), ymd(1984, 7, 15));
    }

    #[test]
    fn leap_day_maps_to_feb_28() {
        assert_eq!(years_before(ymd(2024, 2, 29), 10), ymd(2014, 2, 28));
        assert_eq!(years_before(ymd(2024, 2, 29), 20), ymd(2004, 2, 29));
    }

    #[test]
    fn zero_offsets_are_identity() {
        let today = ymd(2024, 1, 1);
        assert_eq!(years_before(today, 0), today);
        assert_eq!(days_before(today, 0), today);
        assert_eq!(days_before(today, 1), ymd(2023, 12, 31));
    }

    #[test]
    fn days_before_saturates_instead_of_returning_input() {
        assert_eq!(days_before(NaiveDate::MIN, 1), NaiveDate::MIN);
        assert!(days_before(ymd(2024, 1, 1), u32::MAX) < ymd(2024, 1, 1));
    }
}
