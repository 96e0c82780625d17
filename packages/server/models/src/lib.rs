#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! JSON response types for the weather compare server.
//!
//! Field names are part of the public API contract and are kept flat
//! (`last_year_temp`, `ten_years_source`, ...) rather than nested, so these
//! types are separate from the comparison types they are built from.

use serde::{Deserialize, Serialize};
use weather_compare_weather_models::{
    ComparisonReport, DailyComparison, SeriesSlot, WindowDay, YearOffsetDay, format_date,
};

/// `(date, temperature, weather)` of the first day last year's month had
/// the same weather.
pub type ApiSimilarWeather = (String, Option<String>, Option<String>);

/// Today's weather next to the same day 1, 10, 20, 30, and 40 years ago.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiWeatherData {
    pub today_date: String,
    pub today_weather: String,
    pub today_high_temp: Option<String>,
    pub today_low_temp: Option<String>,
    pub today_rain: Option<String>,
    pub today_source: String,
    /// Whether the `today_*` values are yesterday's observation.
    pub is_yesterday_data: bool,

    pub last_year_date: Option<String>,
    pub last_year_temp: Option<String>,
    pub last_year_weather_desc: Option<String>,
    pub last_year_source: String,

    pub ten_years_date: Option<String>,
    pub ten_years_temp: Option<String>,
    pub ten_years_weather_desc: Option<String>,
    pub ten_years_source: String,

    pub twenty_years_date: Option<String>,
    pub twenty_years_temp: Option<String>,
    pub twenty_years_weather_desc: Option<String>,
    pub twenty_years_source: String,

    pub thirty_years_date: Option<String>,
    pub thirty_years_temp: Option<String>,
    pub thirty_years_weather_desc: Option<String>,
    pub thirty_years_source: String,

    pub forty_years_date: Option<String>,
    pub forty_years_temp: Option<String>,
    pub forty_years_weather_desc: Option<String>,
    pub forty_years_source: String,

    pub similar_weather_data: Option<ApiSimilarWeather>,
    pub highest_temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub week_data: Vec<ApiDayEntry>,
}

/// Flattened fields of one [`DailyComparison`].
struct Flat {
    date: Option<String>,
    temp: Option<String>,
    weather: Option<String>,
    source: String,
}

impl From<DailyComparison> for Flat {
    fn from(cmp: DailyComparison) -> Self {
        Self {
            date: cmp.date_string(),
            temp: cmp.temperature,
            weather: cmp.weather,
            source: cmp.source_url,
        }
    }
}

impl From<ComparisonReport> for ApiWeatherData {
    fn from(report: ComparisonReport) -> Self {
        let last_year = Flat::from(report.last_year);
        let ten_years = Flat::from(report.ten_years);
        let twenty_years = Flat::from(report.twenty_years);
        let thirty_years = Flat::from(report.thirty_years);
        let forty_years = Flat::from(report.forty_years);

        Self {
            today_date: format_date(report.today_date),
            today_weather: report.forecast.weather,
            today_high_temp: report.forecast.high,
            today_low_temp: report.forecast.low,
            today_rain: report.forecast.rain,
            today_source: report.forecast.source_url,
            is_yesterday_data: report.forecast.is_fallback,

            last_year_date: last_year.date,
            last_year_temp: last_year.temp,
            last_year_weather_desc: last_year.weather,
            last_year_source: last_year.source,

            ten_years_date: ten_years.date,
            ten_years_temp: ten_years.temp,
            ten_years_weather_desc: ten_years.weather,
            ten_years_source: ten_years.source,

            twenty_years_date: twenty_years.date,
            twenty_years_temp: twenty_years.temp,
            twenty_years_weather_desc: twenty_years.weather,
            twenty_years_source: twenty_years.source,

            thirty_years_date: thirty_years.date,
            thirty_years_temp: thirty_years.temp,
            thirty_years_weather_desc: thirty_years.weather,
            thirty_years_source: thirty_years.source,

            forty_years_date: forty_years.date,
            forty_years_temp: forty_years.temp,
            forty_years_weather_desc: forty_years.weather,
            forty_years_source: forty_years.source,

            similar_weather_data: report
                .similar_weather
                .map(|r| (r.date_string(), r.temperature, r.weather)),
            highest_temp: report.highest_temp,
            week_data: report.window.into_iter().map(ApiDayEntry::from).collect(),
        }
    }
}

/// One day of a `week_data` window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDayEntry {
    pub days_ago: u32,
    /// The day that was looked up, set even when nothing matched.
    pub date: String,
    pub temp: Option<String>,
    pub weather: Option<String>,
    pub source: String,
}

impl From<WindowDay> for ApiDayEntry {
    fn from(day: WindowDay) -> Self {
        Self {
            days_ago: day.days_ago,
            date: format_date(day.date),
            temp: day.comparison.temperature,
            weather: day.comparison.weather,
            source: day.comparison.source_url,
        }
    }
}

/// Response of `/custom-week-weather/{weeks}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCustomWeek {
    pub weeks: u32,
    pub total_days: u32,
    pub week_data: Vec<ApiDayEntry>,
}

impl ApiCustomWeek {
    /// Builds the response from a window covering `weeks` weeks.
    #[must_use]
    pub fn new(weeks: u32, window: Vec<WindowDay>) -> Self {
        Self {
            weeks,
            total_days: weeks * 7,
            week_data: window.into_iter().map(ApiDayEntry::from).collect(),
        }
    }
}

/// Response of `/custom-year-weather/{years}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCustomYear {
    pub years_ago: u32,
    /// Date of the matched record.
    pub date: Option<String>,
    pub temp: Option<String>,
    pub weather: Option<String>,
    pub source: String,
}

impl From<YearOffsetDay> for ApiCustomYear {
    fn from(day: YearOffsetDay) -> Self {
        let date = day.comparison.date_string();
        Self {
            years_ago: day.years_ago,
            date,
            temp: day.comparison.temperature,
            weather: day.comparison.weather,
            source: day.comparison.source_url,
        }
    }
}

/// Calendar year of each chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiGraphYears {
    pub current: i32,
    pub ten_years_ago: i32,
    pub twenty_years_ago: i32,
    pub thirty_years_ago: i32,
    pub forty_years_ago: i32,
}

impl ApiGraphYears {
    /// Years covered by the chart drawn in `current_year`.
    #[must_use]
    pub const fn for_year(current_year: i32) -> Self {
        Self {
            current: SeriesSlot::Current.year(current_year),
            ten_years_ago: SeriesSlot::TenYearsAgo.year(current_year),
            twenty_years_ago: SeriesSlot::TwentyYearsAgo.year(current_year),
            thirty_years_ago: SeriesSlot::ThirtyYearsAgo.year(current_year),
            forty_years_ago: SeriesSlot::FortyYearsAgo.year(current_year),
        }
    }
}

/// Response of `/weather-graph/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiGraph {
    /// Base64-encoded PNG.
    pub image_base64: String,
    pub years: ApiGraphYears,
}

/// Service health status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// `"ok"` while the service is up.
    pub status: String,
}

/// Error body for 4xx and 5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use weather_compare_weather_models::{DailyRecord, ForecastResult};

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn report() -> ComparisonReport {
        let matched = |date: NaiveDate, temp: &str| {
            DailyComparison::matched(
                DailyRecord {
                    date,
                    temperature: Some(temp.to_owned()),
                    weather: Some("晴".to_owned()),
                },
                format!("https://example.test/{date}"),
            )
        };

        ComparisonReport {
            today_date: ymd(2024, 2, 29),
            forecast: ForecastResult {
                weather: "曇".to_owned(),
                high: Some("9.1".to_owned()),
                low: None,
                rain: None,
                source_url: "https://example.test/yesterday".to_owned(),
                is_fallback: true,
            },
            last_year: matched(ymd(2023, 3, 2), "10.2"),
            ten_years: matched(ymd(2014, 3, 1), "8.0"),
            twenty_years: DailyComparison::unmatched("https://example.test/2004"),
            thirty_years: matched(ymd(1994, 3, 1), "6.5"),
            forty_years: matched(ymd(1984, 3, 1), "3.9"),
            similar_weather: Some(DailyRecord {
                date: ymd(2023, 3, 1),
                temperature: Some("9.9".to_owned()),
                weather: Some("晴".to_owned()),
            }),
            highest_temp: Some(18.4),
            window: vec![WindowDay {
                days_ago: 1,
                date: ymd(2024, 2, 29),
                comparison: DailyComparison::unmatched("https://example.test/w"),
            }],
        }
    }

    #[test]
    fn weather_data_uses_flat_field_names() {
        let json = serde_json::to_value(ApiWeatherData::from(report())).unwrap();

        assert_eq!(json["today_date"], "2024-02-29");
        assert_eq!(json["is_yesterday_data"], true);
        assert!(json["today_low_temp"].is_null());
        assert!(json["today_rain"].is_null());
        assert_eq!(json["last_year_date"], "2023-03-02");
        assert_eq!(json["last_year_weather_desc"], "晴");
        assert!(json["twenty_years_temp"].is_null());
        assert_eq!(json["twenty_years_source"], "https://example.test/2004");
        assert_eq!(json["forty_years_temp"], "3.9");
        assert_eq!(
            json["similar_weather_data"],
            serde_json::json!(["2023-03-01", "9.9", "晴"])
        );
        assert_eq!(json["highest_temp"], 18.4);
        assert_eq!(json["week_data"][0]["date"], "2024-02-29");
        assert!(json["week_data"][0]["temp"].is_null());
    }

    #[test]
    fn empty_window_is_omitted() {
        let mut report = report();
        report.window.clear();
        report.similar_weather = None;

        let json = serde_json::to_value(ApiWeatherData::from(report)).unwrap();
        assert!(json.get("week_data").is_none());
        assert!(json["similar_weather_data"].is_null());
    }

    #[test]
    fn custom_week_counts_days() {
        let week = ApiCustomWeek::new(2, Vec::new());
        assert_eq!(week.total_days, 14);
    }

    #[test]
    fn graph_years_count_back_from_current() {
        let years = ApiGraphYears::for_year(2024);
        assert_eq!(years.current, 2024);
        assert_eq!(years.forty_years_ago, 1984);

        let json = serde_json::to_value(years).unwrap();
        assert_eq!(json["thirty_years_ago"], 1994);
    }

    #[test]
    fn custom_year_uses_matched_date() {
        let day = YearOffsetDay {
            years_ago: 0,
            target: ymd(2024, 7, 15),
            comparison: DailyComparison::unmatched("https://example.test/today"),
        };

        let api = ApiCustomYear::from(day);
        assert_eq!(api.date, None);
        assert_eq!(api.source, "https://example.test/today");
    }
}
