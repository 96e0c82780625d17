//! HTTP handler functions for the weather compare API.

use actix_web::{HttpResponse, web};
use chrono::Datelike as _;
use weather_compare_comparison::{DEFAULT_WINDOW_DAYS, WeekCount, YearCount};
use weather_compare_server_models::{
    ApiCustomWeek, ApiCustomYear, ApiError, ApiGraph, ApiGraphYears, ApiHealth, ApiWeatherData,
};

use crate::AppState;

fn bad_request(message: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError::new(message.to_string()))
}

fn internal_error(message: impl ToString) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiError::new(message.to_string()))
}

/// `GET /health/`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        status: "ok".to_string(),
    })
}

/// `GET /weather-data/`
///
/// Today's forecast against the same day 1, 10, 20, 30, and 40 years ago,
/// plus the previous week day by day.
pub async fn weather_data(state: web::Data<AppState>) -> HttpResponse {
    let today = (state.today)();
    log::info!("Building comparison report for {today}");

    let report = state
        .aggregator
        .build_today_report(today, DEFAULT_WINDOW_DAYS)
        .await;

    HttpResponse::Ok().json(ApiWeatherData::from(report))
}

/// `GET /weather-graph/`
///
/// Monthly average temperatures of the current year and 10, 20, 30, and
/// 40 years before, drawn as a base64 PNG line chart.
pub async fn weather_graph(state: web::Data<AppState>) -> HttpResponse {
    let current_year = (state.today)().year();
    let series = state.aggregator.build_monthly_series(current_year).await;

    let chart = state.chart.clone();
    let rendered = web::block(move || chart.render(&series, current_year)).await;

    match rendered {
        Ok(Ok(image_base64)) => HttpResponse::Ok().json(ApiGraph {
            image_base64,
            years: ApiGraphYears::for_year(current_year),
        }),
        Ok(Err(e)) => {
            log::error!("Chart rendering failed: {e}");
            internal_error(e)
        }
        Err(e) => {
            log::error!("Chart rendering task failed: {e}");
            internal_error(e)
        }
    }
}

/// `GET /custom-week-weather/{weeks}/`
///
/// Every day of the last `weeks` weeks (1-52), oldest first.
pub async fn custom_week_weather(
    state: web::Data<AppState>,
    weeks: web::Path<String>,
) -> HttpResponse {
    let weeks = match weeks.parse::<WeekCount>() {
        Ok(weeks) => weeks,
        Err(e) => {
            log::warn!("Rejected custom week request: {e}");
            return bad_request(e);
        }
    };

    let window = state
        .aggregator
        .build_week_window((state.today)(), weeks)
        .await;

    HttpResponse::Ok().json(ApiCustomWeek::new(weeks.weeks(), window))
}

/// `GET /custom-year-weather/{years}/`
///
/// The same calendar day `years` years ago (0-100).
pub async fn custom_year_weather(
    state: web::Data<AppState>,
    years: web::Path<String>,
) -> HttpResponse {
    let years = match years.parse::<YearCount>() {
        Ok(years) => years,
        Err(e) => {
            log::warn!("Rejected custom year request: {e}");
            return bad_request(e);
        }
    };

    let day = state
        .aggregator
        .build_year_offset((state.today)(), years)
        .await;

    HttpResponse::Ok().json(ApiCustomYear::from(day))
}
