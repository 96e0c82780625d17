#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Web scraping primitives for the weather compare data sources.
//!
//! [`html_table`] fetches an observation page and reduces its data table to
//! rows of trimmed cell text. It knows nothing about what the columns mean;
//! that interpretation belongs to the source crate.

pub mod html_table;

/// A single table row as trimmed cell text, one entry per data cell.
pub type Row = Vec<String>;

/// Errors that can occur during scraping operations.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Parsing the response body failed.
    #[error("Parse error: {0}")]
    Parse(String),
}
