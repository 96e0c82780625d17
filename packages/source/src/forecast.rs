//! Regional forecast document.
//!
//! The document is a JSON array of reports; the first report holds three
//! time series in a fixed order:
//!
//! 1. weather, wind and wave, per forecast area (`weathers`)
//! 2. precipitation probability, per forecast area (`pops`)
//! 3. temperatures, per observation point (`temps`, low/high pairs)
//!
//! Each series has its own `timeDefines`, so "today" is located in each one
//! independently.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use weather_compare_weather_models::ForecastResult;

use crate::{SourceConfig, SourceError, WeatherSource};

const WEATHER_SERIES: usize = 0;
const PRECIPITATION_SERIES: usize = 1;
const TEMPERATURE_SERIES: usize = 2;

/// Structural problems found while reading the forecast document.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// The top-level array is empty.
    #[error("forecast document contains no reports")]
    MissingReport,

    /// A required time series is absent.
    #[error("time series {0} is missing")]
    MissingTimeSeries(usize),

    /// Today's date does not appear in the weather time series.
    #[error("date {0} not found in weather time series")]
    DateNotFound(NaiveDate),

    /// The configured area is absent from the weather time series.
    #[error("area {0} not found in weather time series")]
    AreaNotFound(String),

    /// The area has fewer values than time definitions.
    #[error("no {field} value at index {index}")]
    MissingValue {
        /// Name of the value list.
        field: &'static str,
        /// Index that was requested.
        index: usize,
    },

    /// A `timeDefines` entry is not an RFC 3339 timestamp.
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// One report of the forecast document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
    /// Time series blocks, in document order.
    pub time_series: Vec<TimeSeries>,
}

/// A block of values sharing one list of timestamps.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    /// RFC 3339 timestamps the per-area values refer to.
    pub time_defines: Vec<String>,
    /// Per-area values.
    pub areas: Vec<AreaForecast>,
}

/// Values for one area. Which lists are present depends on the block.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaForecast {
    /// Area identification.
    pub area: Area,
    /// Weather labels.
    #[serde(default)]
    pub weathers: Vec<String>,
    /// Precipitation probabilities.
    #[serde(default)]
    pub pops: Vec<String>,
    /// Temperatures as consecutive low/high pairs.
    #[serde(default)]
    pub temps: Vec<String>,
}

/// Area name and code.
#[derive(Debug, Clone, Deserialize)]
pub struct Area {
    /// Area code, e.g. `"130010"`.
    pub code: String,
}

impl TimeSeries {
    /// Index of the first timestamp falling on `today`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Timestamp`] if a timestamp before the match
    /// cannot be parsed.
    pub fn today_index(&self, today: NaiveDate) -> Result<Option<usize>, ForecastError> {
        for (i, time) in self.time_defines.iter().enumerate() {
            if DateTime::parse_from_rfc3339(time)?.date_naive() == today {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    fn area(&self, code: &str) -> Option<&AreaForecast> {
        self.areas.iter().find(|a| a.area.code == code)
    }
}

/// Reads today's forecast out of a parsed document.
///
/// Only the weather label is mandatory. Precipitation and temperatures are
/// left unset when today or the area is not listed in their blocks.
///
/// # Errors
///
/// Returns [`ForecastError`] when the document lacks a report or one of the
/// three time series, when today or the weather area is missing from the
/// weather series, or when a timestamp is malformed.
pub fn parse_forecast(
    reports: &[ForecastReport],
    today: NaiveDate,
    config: &SourceConfig,
) -> Result<ForecastResult, ForecastError> {
    let report = reports.first().ok_or(ForecastError::MissingReport)?;
    let series = |i: usize| {
        report
            .time_series
            .get(i)
            .ok_or(ForecastError::MissingTimeSeries(i))
    };

    let weather_series = series(WEATHER_SERIES)?;
    let index = weather_series
        .today_index(today)?
        .ok_or(ForecastError::DateNotFound(today))?;
    let area = weather_series
        .area(&config.weather_area_code)
        .ok_or_else(|| ForecastError::AreaNotFound(config.weather_area_code.clone()))?;
    let weather = area
        .weathers
        .get(index)
        .ok_or(ForecastError::MissingValue {
            field: "weathers",
            index,
        })?
        .clone();

    let rain = today_precipitation(series(PRECIPITATION_SERIES)?, today, config)?;
    let (low, high) = today_temperatures(series(TEMPERATURE_SERIES)?, today, config)?;

    Ok(ForecastResult {
        weather,
        high,
        low,
        rain,
        source_url: config.forecast_url(),
        is_fallback: false,
    })
}

fn today_precipitation(
    series: &TimeSeries,
    today: NaiveDate,
    config: &SourceConfig,
) -> Result<Option<String>, ForecastError> {
    let Some(index) = series.today_index(today)? else {
        return Ok(None);
    };

    Ok(series
        .area(&config.weather_area_code)
        .and_then(|area| area.pops.get(index))
        .and_then(|pop| non_empty(pop))
        .map(|pop| format!("{pop}%")))
}

/// Returns `(low, high)` for today from the temperature block.
fn today_temperatures(
    series: &TimeSeries,
    today: NaiveDate,
    config: &SourceConfig,
) -> Result<(Option<String>, Option<String>), ForecastError> {
    let Some(index) = series.today_index(today)? else {
        return Ok((None, None));
    };
    let Some(area) = series.area(&config.temperature_area_code) else {
        return Ok((None, None));
    };

    let temp = |i: usize| area.temps.get(i).and_then(|t| non_empty(t));
    Ok((temp(index * 2), temp(index * 2 + 1)))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl WeatherSource {
    /// Fetches the forecast document and reads today's values from it.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails, the body is not the
    /// expected JSON shape, or the document lacks today's weather.
    pub async fn try_fetch_today_forecast(
        &self,
        url: &str,
        today: NaiveDate,
    ) -> Result<ForecastResult, SourceError> {
        log::debug!("Fetching forecast: {url}");

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let reports: Vec<ForecastReport> = serde_json::from_str(&body)?;

        Ok(parse_forecast(&reports, today, &self.config)?)
    }
}
