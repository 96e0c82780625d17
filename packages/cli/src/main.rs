#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for weather compare.
//!
//! ```text
//! weather_compare_cli serve
//! weather_compare_cli today [--window-days 7]
//! weather_compare_cli week <weeks>
//! weather_compare_cli year <years>
//! weather_compare_cli graph [--output chart.png]
//! ```
//!
//! Every subcommand except `serve` prints the same JSON the matching HTTP
//! endpoint returns. Environment variables are read as by the server.

use std::path::PathBuf;

use chrono::Datelike as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use weather_compare_comparison::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS, WeekCount, YearCount};
use weather_compare_server::{AppState, ServerConfig, run_server};
use weather_compare_server_models::{
    ApiCustomWeek, ApiCustomYear, ApiGraph, ApiGraphYears, ApiWeatherData,
};

#[derive(Parser)]
#[command(
    name = "weather_compare_cli",
    about = "Compare today's Tokyo weather with past years"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve,
    /// Print today's comparison report
    Today {
        /// Number of previous days to include day by day (0-364)
        #[arg(
            long,
            default_value_t = DEFAULT_WINDOW_DAYS,
            value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_WINDOW_DAYS))
        )]
        window_days: u32,
    },
    /// Print every day of the last N weeks (1-52)
    Week {
        /// Number of weeks
        #[arg(allow_negative_numbers = true)]
        weeks: WeekCount,
    },
    /// Print the same day N years ago (0-100)
    Year {
        /// Number of years
        #[arg(allow_negative_numbers = true)]
        years: YearCount,
    },
    /// Render the monthly average chart
    Graph {
        /// Write PNG bytes to this file instead of printing the JSON payload
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();
    let config = ServerConfig::from_env();

    match cli.command {
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(run_server(config))
            })
            .await??;
        }
        command => query(command, &config).await?,
    }

    Ok(())
}

async fn query(command: Commands, config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let AppState {
        aggregator,
        chart,
        today,
    } = config.build_state()?;
    let today = today();

    match command {
        Commands::Serve => return Err("serve does not produce a query result".into()),
        Commands::Today { window_days } => {
            let report = aggregator.build_today_report(today, window_days).await;
            print_json(&ApiWeatherData::from(report))?;
        }
        Commands::Week { weeks } => {
            let window = aggregator.build_week_window(today, weeks).await;
            print_json(&ApiCustomWeek::new(weeks.weeks(), window))?;
        }
        Commands::Year { years } => {
            let day = aggregator.build_year_offset(today, years).await;
            print_json(&ApiCustomYear::from(day))?;
        }
        Commands::Graph { output } => {
            let current_year = today.year();
            let series = aggregator.build_monthly_series(current_year).await;

            if let Some(path) = output {
                let png = chart.render_png(&series, current_year)?;
                std::fs::write(&path, png)?;
                log::info!("Wrote chart to {}", path.display());
            } else {
                print_json(&ApiGraph {
                    image_base64: chart.render(&series, current_year)?,
                    years: ApiGraphYears::for_year(current_year),
                })?;
            }
        }
    }

    Ok(())
}
