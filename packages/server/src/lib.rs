#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for weather compare.
//!
//! Serves the comparison report, custom week and year lookups, and the
//! monthly average chart as JSON. Every request reads the upstream
//! weather pages afresh; nothing is cached between requests.

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use chrono::NaiveDate;
use weather_compare_chart::{ChartConfig, ChartRenderer};
use weather_compare_comparison::ComparisonAggregator;
use weather_compare_source::{SourceConfig, WeatherSource, today_in_jst};

/// Shared application state.
pub struct AppState {
    /// Builds every comparison payload.
    pub aggregator: ComparisonAggregator,
    /// Renders the monthly average chart.
    pub chart: ChartRenderer,
    /// Returns the date treated as today.
    pub today: fn() -> NaiveDate,
}

impl AppState {
    /// Creates state that uses today's date in Japan Standard Time.
    #[must_use]
    pub fn new(aggregator: ComparisonAggregator, chart: ChartRenderer) -> Self {
        Self {
            aggregator,
            chart,
            today: today_in_jst,
        }
    }

    /// Replaces the function used to determine today's date.
    #[must_use]
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }
}

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Upstream TCP connect timeout (`UPSTREAM_CONNECT_TIMEOUT_SECS`).
    pub connect_timeout: Duration,
    /// Upstream total request timeout (`UPSTREAM_TIMEOUT_SECS`).
    pub request_timeout: Duration,
    /// Font file tried before the default candidates (`CHART_FONT_PATH`).
    pub chart_font_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8000,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            chart_font_path: None,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from environment variables, falling back to
    /// the defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .map_or(default, Duration::from_secs)
        };

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            connect_timeout: secs("UPSTREAM_CONNECT_TIMEOUT_SECS", defaults.connect_timeout),
            request_timeout: secs("UPSTREAM_TIMEOUT_SECS", defaults.request_timeout),
            chart_font_path: lookup("CHART_FONT_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Upstream source settings with this configuration's timeouts.
    #[must_use]
    pub fn source_config(&self) -> SourceConfig {
        SourceConfig::default().with_timeouts(self.connect_timeout, self.request_timeout)
    }

    /// Chart settings with the configured font tried first.
    #[must_use]
    pub fn chart_config(&self) -> ChartConfig {
        match &self.chart_font_path {
            Some(path) => ChartConfig::default().with_font_path(path.clone()),
            None => ChartConfig::default(),
        }
    }

    /// Builds the application state backed by the live upstream source.
    ///
    /// # Errors
    ///
    /// Returns an `std::io::Error` if the HTTP client cannot be built.
    pub fn build_state(&self) -> std::io::Result<AppState> {
        let source = WeatherSource::new(self.source_config()).map_err(std::io::Error::other)?;

        Ok(AppState::new(
            ComparisonAggregator::new(Arc::new(source)),
            ChartRenderer::new(self.chart_config()),
        ))
    }
}

/// Registers every API route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/weather-data/", web::get().to(handlers::weather_data))
        .route("/weather-graph/", web::get().to(handlers::weather_graph))
        .route(
            "/custom-week-weather/{weeks}/",
            web::get().to(handlers::custom_week_weather),
        )
        .route(
            "/custom-year-weather/{years}/",
            web::get().to(handlers::custom_year_weather),
        )
        .route("/health/", web::get().to(handlers::health));
}

/// Starts the weather compare API server.
///
/// This is a regular async function; the caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`) and for
/// initializing logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP client cannot be built,
/// the server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(config.build_state()?);

    log::info!(
        "Upstream timeouts: connect={:?} total={:?}",
        config.connect_timeout,
        config.request_timeout
    );
    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
