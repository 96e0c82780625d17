#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weather data sources for the Tokyo station.
//!
//! [`WeatherSource`] reads two upstream documents: the historical daily
//! observation page (HTML, one month per page) and the regional forecast
//! document (JSON). Both are addressed by fixed identifiers carried in
//! [`SourceConfig`]. Upstream failures never reach the caller: the
//! historical path degrades to "no records" and the forecast path to a
//! [`ForecastResult`] carrying the unavailable sentinel.
//!
//! Callers that only need the data go through the [`WeatherProvider`]
//! trait so the comparison layer can be exercised without a network.

pub mod forecast;
pub mod historical;
pub mod parsing;
pub mod stats;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta, Utc};
use weather_compare_scraper::ScrapeError;
use weather_compare_scraper::html_table::HtmlTableExtractor;
use weather_compare_weather_models::{DailyRecord, ForecastResult};

pub use forecast::ForecastError;

/// Base URL of the historical daily observation page.
pub const HISTORICAL_BASE_URL: &str = "https://www.data.jma.go.jp/stats/etrn/view/daily_s1.php";

/// Directory holding the regional forecast documents.
pub const FORECAST_BASE_URL: &str = "https://www.jma.go.jp/bosai/forecast/data/forecast";

/// Japan Standard Time, in hours east of UTC.
const JST_OFFSET_HOURS: i64 = 9;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fetching or reading the HTML table failed.
    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// The forecast document did not have the expected shape.
    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),
}

/// Identifiers of the observation station on the historical pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    /// Prefecture code (`prec_no`).
    pub prec_no: String,
    /// Station block number (`block_no`).
    pub block_no: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            prec_no: "44".to_owned(),
            block_no: "47662".to_owned(),
        }
    }
}

/// Upstream locations, identifiers, and HTTP timeouts for [`WeatherSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Historical daily observation page.
    pub historical_base_url: String,
    /// Directory holding `<region>.json` forecast documents.
    pub forecast_base_url: String,
    /// Station on the historical pages.
    pub station: StationConfig,
    /// Forecast document region code.
    pub region_code: String,
    /// Forecast area code for weather and precipitation.
    pub weather_area_code: String,
    /// Forecast area code for temperatures.
    pub temperature_area_code: String,
    /// TCP connect timeout for upstream requests.
    pub connect_timeout: Duration,
    /// Total timeout for a single upstream request.
    pub request_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            historical_base_url: HISTORICAL_BASE_URL.to_owned(),
            forecast_base_url: FORECAST_BASE_URL.to_owned(),
            station: StationConfig::default(),
            region_code: "130000".to_owned(),
            weather_area_code: "130010".to_owned(),
            temperature_area_code: "44132".to_owned(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SourceConfig {
    /// Overrides both upstream base URLs.
    #[must_use]
    pub fn with_base_urls(mut self, historical: &str, forecast: &str) -> Self {
        historical.clone_into(&mut self.historical_base_url);
        forecast.clone_into(&mut self.forecast_base_url);
        self
    }

    /// Overrides the connect and total request timeouts.
    #[must_use]
    pub const fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    /// URL of the forecast document for the configured region.
    #[must_use]
    pub fn forecast_url(&self) -> String {
        format!(
            "{}/{}.json",
            self.forecast_base_url.trim_end_matches('/'),
            self.region_code
        )
    }
}

/// Read access to historical observations and today's forecast.
///
/// Every method is infallible from the caller's point of view: upstream
/// failures are logged by the implementation and surface as empty or unset
/// values.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// URL of the historical page for a month, optionally narrowed to a day.
    fn historical_url(&self, year: i32, month: u32, day: Option<u32>) -> String;

    /// Fetches the daily records of a month. Empty on any upstream failure.
    async fn fetch_historical_month(
        &self,
        year: i32,
        month: u32,
        day: Option<u32>,
    ) -> Vec<DailyRecord>;

    /// Reads today's forecast. Returns the unavailable sentinel on failure.
    async fn fetch_today_forecast(&self, today: NaiveDate) -> ForecastResult;

    /// Mean of the month's convertible temperatures.
    async fn average_temperature(&self, year: i32, month: u32) -> Option<f64> {
        let records = self.fetch_historical_month(year, month, None).await;
        stats::average_temperature(&records)
    }

    /// Highest of the month's non-negative convertible temperatures.
    async fn highest_temperature(&self, year: i32, month: u32) -> Option<f64> {
        let records = self.fetch_historical_month(year, month, None).await;
        stats::highest_temperature(&records)
    }

    /// First record in the month whose weather equals `weather` exactly.
    async fn find_similar_weather(
        &self,
        year: i32,
        month: u32,
        weather: &str,
    ) -> Option<DailyRecord> {
        let records = self.fetch_historical_month(year, month, None).await;
        stats::find_similar_weather(records, weather)
    }
}

/// [`WeatherProvider`] backed by the live upstream documents.
#[derive(Debug, Clone)]
pub struct WeatherSource {
    client: reqwest::Client,
    config: SourceConfig,
    extractor: HtmlTableExtractor,
}

impl WeatherSource {
    /// Builds a source with its own HTTP client using the configured
    /// timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            config,
            extractor: HtmlTableExtractor::new(),
        })
    }

    /// Returns the configuration this source was built with.
    #[must_use]
    pub const fn config(&self) -> &SourceConfig {
        &self.config
    }
}

#[async_trait]
impl WeatherProvider for WeatherSource {
    fn historical_url(&self, year: i32, month: u32, day: Option<u32>) -> String {
        historical::historical_url(&self.config, year, month, day)
    }

    async fn fetch_historical_month(
        &self,
        year: i32,
        month: u32,
        day: Option<u32>,
    ) -> Vec<DailyRecord> {
        match self.try_fetch_historical_month(year, month, day).await {
            Ok(records) => records,
            Err(e) => {
                log::error!("Failed to fetch historical data for {year}-{month:02}: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch_today_forecast(&self, today: NaiveDate) -> ForecastResult {
        let url = self.config.forecast_url();
        match self.try_fetch_today_forecast(&url, today).await {
            Ok(forecast) => {
                log::info!(
                    "Today's forecast: weather={} high={:?} low={:?} rain={:?}",
                    forecast.weather,
                    forecast.high,
                    forecast.low,
                    forecast.rain
                );
                forecast
            }
            Err(e) => {
                log::error!("Failed to read today's forecast from {url}: {e}");
                ForecastResult::unavailable(url)
            }
        }
    }
}

/// Today's calendar date in Japan Standard Time.
#[must_use]
pub fn today_in_jst() -> NaiveDate {
    (Utc::now().naive_utc() + TimeDelta::hours(JST_OFFSET_HOURS)).date()
}
