#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Observation, forecast, and comparison types shared across weather compare.
//!
//! Every value here is request-scoped: it is built fresh from upstream data
//! for a single call and dropped once the response is serialized. Nothing
//! is cached or persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Weather label used when the live forecast could not be read.
pub const UNAVAILABLE_WEATHER: &str = "取得失敗";

/// Number of months in a [`MonthlySeries`].
pub const MONTHS: usize = 12;

/// One day of station observations taken from the historical page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Mean temperature exactly as printed on the page (may carry quality
    /// markers such as `"12.3 )"`).
    pub temperature: Option<String>,
    /// Short weather summary (e.g. `"晴"`).
    pub weather: Option<String>,
}

impl DailyRecord {
    /// Returns the date formatted as `YYYY-MM-DD`.
    #[must_use]
    pub fn date_string(&self) -> String {
        format_date(self.date)
    }
}

/// Today's weather as reported by the forecast document, or substituted
/// from yesterday's observation when the forecast was unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Weather label, or [`UNAVAILABLE_WEATHER`].
    pub weather: String,
    /// Forecast high temperature.
    pub high: Option<String>,
    /// Forecast low temperature.
    pub low: Option<String>,
    /// Precipitation probability, formatted as `"<n>%"`.
    pub rain: Option<String>,
    /// Page the values were read from.
    pub source_url: String,
    /// `true` when the values come from yesterday's observation.
    pub is_fallback: bool,
}

impl ForecastResult {
    /// Creates the result returned when the forecast could not be read.
    #[must_use]
    pub fn unavailable(source_url: impl Into<String>) -> Self {
        Self {
            weather: UNAVAILABLE_WEATHER.to_owned(),
            high: None,
            low: None,
            rain: None,
            source_url: source_url.into(),
            is_fallback: false,
        }
    }

    /// Whether the weather label is the unavailable sentinel.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.weather == UNAVAILABLE_WEATHER
    }

    /// Whether this result can be shown as today's weather without
    /// substituting yesterday's observation.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.is_unavailable() && self.high.as_deref().is_some_and(|h| !h.trim().is_empty())
    }
}

/// A single day's historical lookup.
///
/// `source_url` is always populated, even when no record matched, so the
/// caller can link to the page that was consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyComparison {
    /// Date of the matched record.
    pub date: Option<NaiveDate>,
    /// Temperature of the matched record.
    pub temperature: Option<String>,
    /// Weather label of the matched record.
    pub weather: Option<String>,
    /// Historical page for the requested day.
    pub source_url: String,
}

impl DailyComparison {
    /// Creates a comparison with no matching record.
    #[must_use]
    pub fn unmatched(source_url: impl Into<String>) -> Self {
        Self {
            date: None,
            temperature: None,
            weather: None,
            source_url: source_url.into(),
        }
    }

    /// Creates a comparison from a matched record.
    #[must_use]
    pub fn matched(record: DailyRecord, source_url: impl Into<String>) -> Self {
        Self {
            date: Some(record.date),
            temperature: record.temperature,
            weather: record.weather,
            source_url: source_url.into(),
        }
    }

    /// Returns the matched date formatted as `YYYY-MM-DD`.
    #[must_use]
    pub fn date_string(&self) -> Option<String> {
        self.date.map(format_date)
    }
}

/// One entry of a day-by-day window counting back from today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDay {
    /// How many days before today this entry is.
    pub days_ago: u32,
    /// The day that was looked up.
    pub date: NaiveDate,
    /// Lookup result for `date`.
    pub comparison: DailyComparison,
}

/// A single day looked up at a caller-chosen number of years before today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearOffsetDay {
    /// How many calendar years back the lookup went.
    pub years_ago: u32,
    /// The day that was looked up.
    pub target: NaiveDate,
    /// Lookup result for `target`.
    pub comparison: DailyComparison,
}

/// Today's weather next to the same day 1, 10, 20, 30, and 40 years ago.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Date the `forecast` values belong to (yesterday when falling back).
    pub today_date: NaiveDate,
    /// Today's forecast, or yesterday's observation.
    pub forecast: ForecastResult,
    /// 365 days ago.
    pub last_year: DailyComparison,
    /// Same calendar day 10 years ago.
    pub ten_years: DailyComparison,
    /// Same calendar day 20 years ago.
    pub twenty_years: DailyComparison,
    /// Same calendar day 30 years ago.
    pub thirty_years: DailyComparison,
    /// Same calendar day 40 years ago.
    pub forty_years: DailyComparison,
    /// First day in last year's month with the same weather as 365 days ago.
    pub similar_weather: Option<DailyRecord>,
    /// Highest temperature in last year's month.
    pub highest_temp: Option<f64>,
    /// Day-by-day window, oldest first.
    pub window: Vec<WindowDay>,
}

/// The five fixed series of the monthly-average chart.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SeriesSlot {
    /// The current calendar year.
    Current,
    /// Ten years before the current year.
    TenYearsAgo,
    /// Twenty years before the current year.
    TwentyYearsAgo,
    /// Thirty years before the current year.
    ThirtyYearsAgo,
    /// Forty years before the current year.
    FortyYearsAgo,
}

impl SeriesSlot {
    /// All slots in plotting order.
    pub const ALL: [Self; 5] = [
        Self::Current,
        Self::TenYearsAgo,
        Self::TwentyYearsAgo,
        Self::ThirtyYearsAgo,
        Self::FortyYearsAgo,
    ];

    /// Number of years this slot lies before the current year.
    #[must_use]
    pub const fn years_back(self) -> i32 {
        match self {
            Self::Current => 0,
            Self::TenYearsAgo => 10,
            Self::TwentyYearsAgo => 20,
            Self::ThirtyYearsAgo => 30,
            Self::FortyYearsAgo => 40,
        }
    }

    /// Calendar year this slot covers, given the current year.
    #[must_use]
    pub const fn year(self, current_year: i32) -> i32 {
        current_year - self.years_back()
    }

    /// Legend label, e.g. `"2024年 (今年)"` or `"2014年 (10年前)"`.
    #[must_use]
    pub fn label(self, current_year: i32) -> String {
        let year = self.year(current_year);
        match self {
            Self::Current => format!("{year}年 (今年)"),
            _ => format!("{year}年 ({}年前)", self.years_back()),
        }
    }
}

/// Average temperature per month for one calendar year.
///
/// `values[0]` is January; a month with no convertible temperature is
/// `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    /// Which chart slot the series belongs to.
    pub slot: SeriesSlot,
    /// Calendar year the averages were computed for.
    pub year: i32,
    /// Monthly averages, index = month - 1.
    pub values: [Option<f64>; MONTHS],
}

impl MonthlySeries {
    /// Creates a series with every month unset.
    #[must_use]
    pub const fn new(slot: SeriesSlot, year: i32) -> Self {
        Self {
            slot,
            year,
            values: [None; MONTHS],
        }
    }

    /// Stores the average for `month` (1-12). Out-of-range months are
    /// ignored.
    pub fn set(&mut self, month: u32, value: Option<f64>) {
        if let Some(slot) = (month as usize)
            .checked_sub(1)
            .and_then(|i| self.values.get_mut(i))
        {
            *slot = value;
        }
    }

    /// Whether every month is unset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Iterates `(month, value)` pairs for the months that have a value.
    pub fn points(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.values
            .iter()
            .zip(1u32..)
            .filter_map(|(value, month)| value.map(|v| (month, v)))
    }
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_without_high_is_not_usable() {
        let mut forecast = ForecastResult::unavailable("https://example.test");
        forecast.weather = "晴れ".to_owned();
        assert!(!forecast.is_usable());

        forecast.high = Some(String::new());
        assert!(!forecast.is_usable());

        forecast.high = Some("24".to_owned());
        assert!(forecast.is_usable());
    }

    #[test]
    fn sentinel_forecast_is_unavailable() {
        let mut forecast = ForecastResult::unavailable("https://example.test");
        forecast.high = Some("24".to_owned());
        assert!(forecast.is_unavailable());
        assert!(!forecast.is_usable());
    }

    #[test]
    fn series_slot_labels() {
        assert_eq!(SeriesSlot::Current.label(2024), "2024年 (今年)");
        assert_eq!(SeriesSlot::ThirtyYearsAgo.label(2024), "1994年 (30年前)");
        assert_eq!(SeriesSlot::FortyYearsAgo.to_string(), "forty_years_ago");
        assert_eq!("ten_years_ago".parse(), Ok(SeriesSlot::TenYearsAgo));
    }

    #[test]
    fn monthly_series_set_and_points() {
        let mut series = MonthlySeries::new(SeriesSlot::TenYearsAgo, 2014);
        assert!(series.is_empty());

        series.set(1, Some(5.5));
        series.set(12, Some(7.25));
        series.set(0, Some(99.0));
        series.set(13, Some(99.0));

        assert!(!series.is_empty());
        let points: Vec<(u32, f64)> = series.points().collect();
        assert_eq!(points, vec![(1, 5.5), (12, 7.25)]);
    }

    #[test]
    fn unmatched_comparison_keeps_source() {
        let cmp = DailyComparison::unmatched("https://example.test/page");
        assert!(cmp.date_string().is_none());
        assert_eq!(cmp.source_url, "https://example.test/page");
    }

    #[test]
    fn record_date_serializes_as_iso() {
        let record = DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            temperature: Some("8.1".to_owned()),
            weather: None,
        };
        assert_eq!(record.date_string(), "2024-03-05");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-03-05");
    }
}
