#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cross-year comparisons built from repeated weather source lookups.
//!
//! Every lookup goes to the upstream source in sequence; nothing fetched
//! for one day is reused for another. A day whose fetch fails simply has
//! unset fields, so building a report never fails as a whole.

pub mod dates;
pub mod validation;

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use weather_compare_source::WeatherProvider;
use weather_compare_weather_models::{
    ComparisonReport, DailyComparison, ForecastResult, MonthlySeries, SeriesSlot,
    UNAVAILABLE_WEATHER, WindowDay, YearOffsetDay,
};

pub use dates::YearOffset;
pub use validation::{MAX_WINDOW_DAYS, ValidationError, WeekCount, YearCount};

/// Days covered by the default window of the comparison report.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Builds comparison payloads on top of a [`WeatherProvider`].
#[derive(Clone)]
pub struct ComparisonAggregator {
    provider: Arc<dyn WeatherProvider>,
}

impl ComparisonAggregator {
    /// Creates an aggregator reading from `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Looks up a single day on the historical page.
    ///
    /// The page for the day's month is fetched and the record whose date
    /// equals `target` is picked. The source URL is always set.
    pub async fn build_daily_comparison(&self, target: NaiveDate) -> DailyComparison {
        let (year, month, day) = (target.year(), target.month(), target.day());
        let source_url = self.provider.historical_url(year, month, Some(day));

        let records = self
            .provider
            .fetch_historical_month(year, month, Some(day))
            .await;

        match records.into_iter().find(|r| r.date == target) {
            Some(record) => DailyComparison::matched(record, source_url),
            None => {
                log::debug!("No historical record for {target}");
                DailyComparison::unmatched(source_url)
            }
        }
    }

    /// Builds today's report against 1, 10, 20, 30, and 40 years ago.
    ///
    /// If the forecast is unavailable or has no high temperature, today's
    /// fields are replaced with yesterday's observation and the report is
    /// flagged as a fallback. `window_days` adds a day-by-day window of
    /// that many previous days (0 for none).
    pub async fn build_today_report(&self, today: NaiveDate, window_days: u32) -> ComparisonReport {
        let forecast = self.provider.fetch_today_forecast(today).await;
        let (today_date, forecast) = if forecast.is_usable() {
            (today, forecast)
        } else {
            log::warn!(
                "Forecast unusable (weather={}, high={:?}), using yesterday's observation",
                forecast.weather,
                forecast.high
            );
            self.yesterday_fallback(today).await
        };

        let last_year = self
            .build_daily_comparison(YearOffset::LastYear.target_date(today))
            .await;
        let ten_years = self
            .build_daily_comparison(YearOffset::TenYears.target_date(today))
            .await;
        let twenty_years = self
            .build_daily_comparison(YearOffset::TwentyYears.target_date(today))
            .await;
        let thirty_years = self
            .build_daily_comparison(YearOffset::ThirtyYears.target_date(today))
            .await;
        let forty_years = self
            .build_daily_comparison(YearOffset::FortyYears.target_date(today))
            .await;

        let last_year_date = YearOffset::LastYear.target_date(today);
        let (year, month) = (last_year_date.year(), last_year_date.month());

        let similar_weather = match last_year.weather.as_deref() {
            Some(weather) => self.provider.find_similar_weather(year, month, weather).await,
            None => None,
        };
        let highest_temp = self.provider.highest_temperature(year, month).await;

        let window = self.build_day_window(today, window_days).await;

        ComparisonReport {
            today_date,
            forecast,
            last_year,
            ten_years,
            twenty_years,
            thirty_years,
            forty_years,
            similar_weather,
            highest_temp,
            window,
        }
    }

    async fn yesterday_fallback(&self, today: NaiveDate) -> (NaiveDate, ForecastResult) {
        let yesterday = dates::days_before(today, 1);
        let observed = self.build_daily_comparison(yesterday).await;

        let forecast = ForecastResult {
            weather: observed
                .weather
                .unwrap_or_else(|| UNAVAILABLE_WEATHER.to_owned()),
            high: observed.temperature,
            low: None,
            rain: None,
            source_url: observed.source_url,
            is_fallback: true,
        };

        (yesterday, forecast)
    }

    /// Looks up each of the `days` days before `today`, oldest first.
    ///
    /// `days` is capped at [`MAX_WINDOW_DAYS`].
    pub async fn build_day_window(&self, today: NaiveDate, days: u32) -> Vec<WindowDay> {
        if days > MAX_WINDOW_DAYS {
            log::warn!("Window of {days} days capped at {MAX_WINDOW_DAYS}");
        }
        let days = days.min(MAX_WINDOW_DAYS);
        let mut window = Vec::with_capacity(days as usize);

        for days_ago in (1..=days).rev() {
            let date = dates::days_before(today, days_ago);
            let comparison = self.build_daily_comparison(date).await;
            window.push(WindowDay {
                days_ago,
                date,
                comparison,
            });
        }

        window
    }

    /// Looks up every day of the last `weeks` weeks, oldest first.
    pub async fn build_week_window(&self, today: NaiveDate, weeks: WeekCount) -> Vec<WindowDay> {
        log::info!("Building {}-week window ending {today}", weeks.weeks());
        self.build_day_window(today, weeks.days()).await
    }

    /// Looks up the same calendar day `years` years before `today`.
    ///
    /// Zero years looks up today on the historical page, not the forecast.
    pub async fn build_year_offset(&self, today: NaiveDate, years: YearCount) -> YearOffsetDay {
        let target = dates::years_before(today, years.years());
        let comparison = self.build_daily_comparison(target).await;

        YearOffsetDay {
            years_ago: years.years(),
            target,
            comparison,
        }
    }

    /// Computes the monthly average temperatures of every chart slot.
    ///
    /// Months are walked in order and, within a month, slots in plotting
    /// order; every average is a separate sequential fetch. A month whose
    /// average is exactly `0.0` keeps that value rather than becoming unset.
    pub async fn build_monthly_series(&self, current_year: i32) -> Vec<MonthlySeries> {
        let mut series: Vec<MonthlySeries> = SeriesSlot::ALL
            .iter()
            .map(|slot| MonthlySeries::new(*slot, slot.year(current_year)))
            .collect();

        for month in 1..=12 {
            for entry in &mut series {
                let average = self.provider.average_temperature(entry.year, month).await;
                entry.set(month, average);
            }
        }

        for entry in &series {
            log::debug!("{} averages: {:?}", entry.slot, entry.values);
        }

        series
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use weather_compare_weather_models::DailyRecord;

    use super::*;

    type Call = (i32, u32, Option<u32>);

    /// In-memory provider that records every historical fetch.
    struct FakeProvider {
        months: BTreeMap<(i32, u32), Vec<DailyRecord>>,
        forecast: ForecastResult,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeProvider {
        fn new(forecast: ForecastResult) -> Self {
            Self {
                months: BTreeMap::new(),
                forecast,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_record(mut self, date: NaiveDate, temp: &str, weather: &str) -> Self {
            self.months
                .entry((date.year(), date.month()))
                .or_default()
                .push(DailyRecord {
                    date,
                    temperature: Some(temp.to_owned()),
                    weather: Some(weather.to_owned()),
                });
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        fn historical_url(&self, year: i32, month: u32, day: Option<u32>) -> String {
            match day {
                Some(day) => format!("https://example.test/daily?year={year}&month={month}&day={day}"),
                None => format!("https://example.test/daily?year={year}&month={month}"),
            }
        }

        async fn fetch_historical_month(
            &self,
            year: i32,
            month: u32,
            day: Option<u32>,
        ) -> Vec<DailyRecord> {
            self.calls.lock().unwrap().push((year, month, day));
            self.months.get(&(year, month)).cloned().unwrap_or_default()
        }

        async fn fetch_today_forecast(&self, _today: NaiveDate) -> ForecastResult {
            self.forecast.clone()
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn live_forecast() -> ForecastResult {
        ForecastResult {
            weather: "晴れ".to_owned(),
            high: Some("31".to_owned()),
            low: Some("24".to_owned()),
            rain: Some("10%".to_owned()),
            source_url: "https://example.test/forecast.json".to_owned(),
            is_fallback: false,
        }
    }

    fn aggregator(provider: FakeProvider) -> (ComparisonAggregator, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        (ComparisonAggregator::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn daily_comparison_without_rows_keeps_source_url() {
        let (agg, _) = aggregator(FakeProvider::new(live_forecast()));

        let cmp = agg.build_daily_comparison(ymd(1990, 5, 3)).await;
        assert_eq!(cmp.date, None);
        assert_eq!(cmp.temperature, None);
        assert_eq!(cmp.weather, None);
        assert_eq!(cmp.source_url, "https://example.test/daily?year=1990&month=5&day=3");
    }

    #[tokio::test]
    async fn daily_comparison_picks_exact_date_from_month() {
        let provider = FakeProvider::new(live_forecast())
            .with_record(ymd(1990, 5, 2), "17.0", "雨")
            .with_record(ymd(1990, 5, 3), "18.5", "晴");
        let (agg, provider) = aggregator(provider);

        let cmp = agg.build_daily_comparison(ymd(1990, 5, 3)).await;
        assert_eq!(cmp.date_string().as_deref(), Some("1990-05-03"));
        assert_eq!(cmp.temperature.as_deref(), Some("18.5"));
        assert_eq!(cmp.weather.as_deref(), Some("晴"));
        assert_eq!(provider.calls(), vec![(1990, 5, Some(3))]);
    }

    #[tokio::test]
    async fn report_uses_live_forecast_and_year_offsets() {
        let today = ymd(2024, 7, 15);
        let provider = FakeProvider::new(live_forecast())
            .with_record(ymd(2023, 7, 2), "27.0", "曇")
            .with_record(ymd(2023, 7, 5), "29.0", "晴")
            .with_record(ymd(2023, 7, 16), "30.5", "晴")
            .with_record(ymd(2023, 7, 20), "-1.0", "晴")
            .with_record(ymd(2014, 7, 15), "25.0", "雨");
        let (agg, provider) = aggregator(provider);

        let report = agg.build_today_report(today, 0).await;

        assert_eq!(report.today_date, today);
        assert!(!report.forecast.is_fallback);
        assert_eq!(report.forecast.low.as_deref(), Some("24"));
        assert_eq!(report.forecast.rain.as_deref(), Some("10%"));

        // 365 days before a date in a leap year is one calendar day later.
        assert_eq!(report.last_year.date, Some(ymd(2023, 7, 16)));
        assert_eq!(report.ten_years.date, Some(ymd(2014, 7, 15)));
        assert_eq!(report.twenty_years.date, None);
        assert!(report.forty_years.source_url.contains("year=1984"));

        let similar = report.similar_weather.unwrap();
        assert_eq!(similar.date, ymd(2023, 7, 5));
        assert_eq!(report.highest_temp, Some(30.5));
        assert!(report.window.is_empty());

        let calls = provider.calls();
        assert_eq!(
            &calls[..5],
            &[
                (2023, 7, Some(16)),
                (2014, 7, Some(15)),
                (2004, 7, Some(15)),
                (1994, 7, Some(15)),
                (1984, 7, Some(15)),
            ]
        );
        assert_eq!(&calls[5..], &[(2023, 7, None), (2023, 7, None)]);
    }

    #[tokio::test]
    async fn unavailable_forecast_falls_back_to_yesterday() {
        let today = ymd(2024, 3, 1);
        let provider = FakeProvider::new(ForecastResult::unavailable("https://example.test/f.json"))
            .with_record(ymd(2024, 2, 29), "9.1", "曇後雨");
        let (agg, _) = aggregator(provider);

        let report = agg.build_today_report(today, 0).await;

        assert!(report.forecast.is_fallback);
        assert_eq!(report.today_date, ymd(2024, 2, 29));
        assert_eq!(report.forecast.weather, "曇後雨");
        assert_eq!(report.forecast.high.as_deref(), Some("9.1"));
        assert_eq!(report.forecast.low, None);
        assert_eq!(report.forecast.rain, None);
        assert_eq!(
            report.forecast.source_url,
            "https://example.test/daily?year=2024&month=2&day=29"
        );
    }

    #[tokio::test]
    async fn forecast_without_high_falls_back() {
        let mut forecast = live_forecast();
        forecast.high = None;
        let (agg, _) = aggregator(FakeProvider::new(forecast));

        let report = agg.build_today_report(ymd(2024, 3, 1), 0).await;

        assert!(report.forecast.is_fallback);
        assert_eq!(report.forecast.weather, UNAVAILABLE_WEATHER);
        assert_eq!(report.forecast.high, None);
        assert_eq!(report.forecast.low, None);
        assert_eq!(report.forecast.rain, None);
    }

    #[tokio::test]
    async fn missing_last_year_weather_skips_similar_lookup() {
        let (agg, provider) = aggregator(FakeProvider::new(live_forecast()));

        let report = agg.build_today_report(ymd(2023, 7, 15), 0).await;

        assert!(report.similar_weather.is_none());
        assert_eq!(report.highest_temp, None);
        // Five daily lookups plus one month fetch for the maximum.
        assert_eq!(provider.calls().len(), 6);
    }

    #[tokio::test]
    async fn report_includes_default_window() {
        let (agg, _) = aggregator(FakeProvider::new(live_forecast()));

        let report = agg
            .build_today_report(ymd(2024, 7, 15), DEFAULT_WINDOW_DAYS)
            .await;

        let days_ago: Vec<u32> = report.window.iter().map(|d| d.days_ago).collect();
        assert_eq!(days_ago, vec![7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(report.window[0].date, ymd(2024, 7, 8));
        assert_eq!(report.window[6].date, ymd(2024, 7, 14));
    }

    #[tokio::test]
    async fn one_week_window_has_seven_days_most_recent_last() {
        let provider = FakeProvider::new(live_forecast()).with_record(ymd(2024, 1, 2), "6.4", "晴");
        let (agg, _) = aggregator(provider);

        let window = agg
            .build_week_window(ymd(2024, 1, 3), WeekCount::new(1).unwrap())
            .await;

        assert_eq!(window.len(), 7);
        assert_eq!(window.first().unwrap().days_ago, 7);
        assert_eq!(window.first().unwrap().date, ymd(2023, 12, 27));
        let last = window.last().unwrap();
        assert_eq!(last.days_ago, 1);
        assert_eq!(last.comparison.temperature.as_deref(), Some("6.4"));
    }

    #[tokio::test]
    async fn oversized_day_window_is_capped() {
        let (agg, provider) = aggregator(FakeProvider::new(live_forecast()));

        let window = agg.build_day_window(ymd(2024, 7, 15), u32::MAX).await;

        assert_eq!(window.len(), MAX_WINDOW_DAYS as usize);
        assert_eq!(window[0].days_ago, MAX_WINDOW_DAYS);
        assert_eq!(window[0].date, ymd(2023, 7, 17));
        assert_eq!(provider.calls().len(), MAX_WINDOW_DAYS as usize);
    }

    #[tokio::test]
    async fn zero_year_offset_uses_historical_page_for_today() {
        let today = ymd(2024, 7, 15);
        let provider = FakeProvider::new(live_forecast()).with_record(today, "28.8", "晴");
        let (agg, provider) = aggregator(provider);

        let day = agg
            .build_year_offset(today, YearCount::new(0).unwrap())
            .await;

        assert_eq!(day.years_ago, 0);
        assert_eq!(day.target, today);
        assert_eq!(day.comparison.temperature.as_deref(), Some("28.8"));
        assert_eq!(provider.calls(), vec![(2024, 7, Some(15))]);
    }

    #[tokio::test]
    async fn monthly_series_cover_every_slot_and_month() {
        let provider = FakeProvider::new(live_forecast())
            .with_record(ymd(2024, 1, 1), "4.0", "晴")
            .with_record(ymd(2024, 1, 2), "6.0", "晴")
            .with_record(ymd(1984, 8, 1), "0.0", "晴");
        let (agg, provider) = aggregator(provider);

        let series = agg.build_monthly_series(2024).await;

        assert_eq!(series.len(), 5);
        assert_eq!(series[0].slot, SeriesSlot::Current);
        assert_eq!(series[0].values[0], Some(5.0));
        assert_eq!(series[4].year, 1984);
        assert_eq!(series[4].values[7], Some(0.0));
        assert!(series[1].is_empty());

        let calls = provider.calls();
        assert_eq!(calls.len(), 60);
        assert_eq!(&calls[..2], &[(2024, 1, None), (2014, 1, None)]);
        assert_eq!(calls[59], (1984, 12, None));
    }
}
