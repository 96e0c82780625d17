//! Historical daily observation pages.
//!
//! The upstream site serves a whole month per page; there is no single-day
//! query. Passing a `day` only changes which day the page highlights, so
//! single-day lookups fetch the month and filter afterwards.

use weather_compare_scraper::html_table;
use weather_compare_weather_models::DailyRecord;

use crate::{SourceConfig, SourceError, StationConfig, WeatherSource, parsing};

/// Builds the historical page URL for a month, optionally with a day.
#[must_use]
pub fn historical_url(config: &SourceConfig, year: i32, month: u32, day: Option<u32>) -> String {
    let StationConfig { prec_no, block_no } = &config.station;
    let base = &config.historical_base_url;

    match day {
        Some(day) => format!(
            "{base}?prec_no={prec_no}&block_no={block_no}&year={year}&month={month}&day={day}&view=p1"
        ),
        None => {
            format!("{base}?prec_no={prec_no}&block_no={block_no}&year={year}&month={month}&view=p1")
        }
    }
}

impl WeatherSource {
    /// Fetches and parses one historical page.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Scrape`] if the request fails, the server
    /// returns a non-success status, or the table cannot be read.
    pub async fn try_fetch_historical_month(
        &self,
        year: i32,
        month: u32,
        day: Option<u32>,
    ) -> Result<Vec<DailyRecord>, SourceError> {
        let url = historical_url(&self.config, year, month, day);
        log::debug!("Fetching historical observations: {url}");

        let rows = html_table::fetch_table(&self.client, &url, &self.extractor).await?;
        let records = parsing::parse_daily_records(&rows, year, month);

        log::debug!(
            "Parsed {} of {} rows for {year}-{month:02}",
            records.len(),
            rows.len()
        );
        Ok(records)
    }
}
