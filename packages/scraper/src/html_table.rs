//! HTML table extractor.
//!
//! Locates a single `<table>` element via CSS selector, drops a fixed number
//! of leading header rows, and returns the remaining rows as trimmed cell
//! text. A page without the table yields no rows rather than an error.

use scraper::{ElementRef, Html, Selector};

use crate::{Row, ScrapeError};

/// CSS selector of the daily observation table on the historical pages.
pub const DAILY_TABLE_SELECTOR: &str = "table.data2_s";

/// Number of header rows above the first day in the daily table.
pub const DAILY_HEADER_ROWS: usize = 4;

/// Extracts rows of cell text from an HTML table.
///
/// The defaults match the daily observation table. Use the builder methods
/// to customise selectors for other layouts.
#[derive(Debug, Clone)]
pub struct HtmlTableExtractor {
    /// CSS selector for the target table element.
    table_selector: String,
    /// CSS selector for rows inside the table.
    row_selector: String,
    /// CSS selector for data cells within a row.
    cell_selector: String,
    /// Leading rows to drop before extracting.
    skip_rows: usize,
}

impl Default for HtmlTableExtractor {
    fn default() -> Self {
        Self {
            table_selector: DAILY_TABLE_SELECTOR.to_owned(),
            row_selector: "tr".to_owned(),
            cell_selector: "td".to_owned(),
            skip_rows: DAILY_HEADER_ROWS,
        }
    }
}

impl HtmlTableExtractor {
    /// Creates an extractor for the daily observation table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the CSS selector used to locate the table element.
    #[must_use]
    pub fn with_table_selector(mut self, selector: &str) -> Self {
        selector.clone_into(&mut self.table_selector);
        self
    }

    /// Overrides the CSS selector used to locate cells within a row.
    #[must_use]
    pub fn with_cell_selector(mut self, selector: &str) -> Self {
        selector.clone_into(&mut self.cell_selector);
        self
    }

    /// Overrides the number of leading rows to drop.
    #[must_use]
    pub const fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    /// Parses `body` and returns the data rows of the first matching table.
    ///
    /// Rows without any data cell are dropped. When no table matches, the
    /// result is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Parse`] if one of the configured CSS selectors
    /// is invalid.
    pub fn extract(&self, body: &str) -> Result<Vec<Row>, ScrapeError> {
        let table_sel = parse_selector(&self.table_selector)?;
        let row_sel = parse_selector(&self.row_selector)?;
        let cell_sel = parse_selector(&self.cell_selector)?;

        let document = Html::parse_document(body);

        let Some(table) = document.select(&table_sel).next() else {
            log::debug!("No element matching '{}' in page", self.table_selector);
            return Ok(Vec::new());
        };

        let rows = table
            .select(&row_sel)
            .skip(self.skip_rows)
            .map(|row| row.select(&cell_sel).map(cell_text).collect::<Row>())
            .filter(|cells| !cells.is_empty())
            .collect();

        Ok(rows)
    }
}

/// Fetches `url` and extracts its table rows.
///
/// # Errors
///
/// Returns [`ScrapeError::Http`] if the request fails or the server returns
/// a non-success status, and [`ScrapeError::Parse`] for invalid selectors.
pub async fn fetch_table(
    client: &reqwest::Client,
    url: &str,
    extractor: &HtmlTableExtractor,
) -> Result<Vec<Row>, ScrapeError> {
    log::debug!("Fetching HTML table from {url}");

    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;

    extractor.extract(&body)
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_owned()
}

/// Parses a CSS selector string, returning a [`ScrapeError`] on failure.
fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::Parse(format!("invalid CSS selector '{selector}': {e}")))
}
