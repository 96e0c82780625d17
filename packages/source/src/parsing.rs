//! Turns raw rows of the daily observation table into [`DailyRecord`]s.
//!
//! Also holds the temperature-string checks used by [`crate::stats`]. The
//! signed check accepts a `-` and the unsigned one does not, so the monthly
//! maximum never sees sub-zero days while the monthly mean does.

use chrono::NaiveDate;
use weather_compare_scraper::Row;
use weather_compare_weather_models::DailyRecord;

/// Column of the daily mean temperature.
pub const TEMPERATURE_INDEX: usize = 7;

/// Column of the daytime weather summary.
pub const WEATHER_INDEX: usize = 20;

/// Converts table rows of one month into daily records.
///
/// Rows with `TEMPERATURE_INDEX`/`WEATHER_INDEX` out of range are skipped.
/// A row whose first cell is not a valid day of the month is skipped as
/// well; the rest of the batch is kept.
#[must_use]
pub fn parse_daily_records(rows: &[Row], year: i32, month: u32) -> Vec<DailyRecord> {
    let min_len = TEMPERATURE_INDEX.max(WEATHER_INDEX);

    rows.iter()
        .filter(|row| row.len() > min_len)
        .filter_map(|row| {
            let Some(date) = parse_day(&row[0], year, month) else {
                log::debug!("Skipping row with malformed day {:?} for {year}-{month:02}", row[0]);
                return None;
            };

            Some(DailyRecord {
                date,
                temperature: non_empty(&row[TEMPERATURE_INDEX]),
                weather: non_empty(&row[WEATHER_INDEX]),
            })
        })
        .collect()
}

/// Parses the day-of-month cell into a full date.
fn parse_day(cell: &str, year: i32, month: u32) -> Option<NaiveDate> {
    let day = cell.trim().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn non_empty(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Whether `s` is digits with at most one `.` and at most one `-`.
///
/// The `-` may appear anywhere, matching the historical check; strings that
/// pass but still do not parse (e.g. `"1-2"`) are rejected by
/// [`signed_temperature`].
#[must_use]
pub fn is_signed_decimal(s: &str) -> bool {
    is_ascii_digits(&s.replacen('.', "", 1).replacen('-', "", 1))
}

/// Whether `s` is digits with at most one `.`. Negative values fail.
#[must_use]
pub fn is_unsigned_decimal(s: &str) -> bool {
    is_ascii_digits(&s.replacen('.', "", 1))
}

fn is_ascii_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a temperature that passes [`is_signed_decimal`].
#[must_use]
pub fn signed_temperature(s: &str) -> Option<f64> {
    if is_signed_decimal(s) {
        s.parse().ok()
    } else {
        None
    }
}

/// Parses a temperature that passes [`is_unsigned_decimal`].
#[must_use]
pub fn unsigned_temperature(s: &str) -> Option<f64> {
    if is_unsigned_decimal(s) {
        s.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: &str, temp: &str, weather: &str) -> Row {
        let mut cells = vec![String::from("x"); WEATHER_INDEX + 1];
        cells[0] = day.to_owned();
        cells[TEMPERATURE_INDEX] = temp.to_owned();
        cells[WEATHER_INDEX] = weather.to_owned();
        cells
    }

    #[test]
    fn parses_rows_into_zero_padded_dates() {
        let rows = vec![row("1", "5.2", "晴"), row("15", "-0.4", "雪")];
        let records = parse_daily_records(&rows, 2024, 2);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date_string(), "2024-02-01");
        assert_eq!(records[0].temperature.as_deref(), Some("5.2"));
        assert_eq!(records[0].weather.as_deref(), Some("晴"));
        assert_eq!(records[1].date_string(), "2024-02-15");
        assert_eq!(records[1].temperature.as_deref(), Some("-0.4"));
    }

    #[test]
    fn skips_short_rows() {
        let mut short = row("2", "6.0", "曇");
        short.truncate(WEATHER_INDEX);
        let rows = vec![row("1", "5.2", "晴"), short, vec!["3".to_owned()]];

        let records = parse_daily_records(&rows, 2024, 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date_string(), "2024-02-01");
    }

    #[test]
    fn skips_malformed_day_but_keeps_batch() {
        let rows = vec![
            row("合計", "5.2", "晴"),
            row("30", "5.2", "晴"),
            row("3", "7.0", "雨"),
        ];

        let records = parse_daily_records(&rows, 2023, 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date_string(), "2023-02-03");
    }

    #[test]
    fn empty_cells_are_unset() {
        let records = parse_daily_records(&[row("4", "", " ")], 2024, 7);
        assert_eq!(records[0].temperature, None);
        assert_eq!(records[0].weather, None);
    }

    #[test]
    fn signed_check_accepts_negative_and_unsigned_does_not() {
        assert!(is_signed_decimal("-3.5"));
        assert!(!is_unsigned_decimal("-3.5"));

        assert!(is_signed_decimal("12.3"));
        assert!(is_unsigned_decimal("12.3"));

        assert!(!is_signed_decimal(""));
        assert!(!is_signed_decimal("12.3 )"));
        assert!(!is_unsigned_decimal("1.2.3"));
        assert!(!is_unsigned_decimal("--"));
    }

    #[test]
    fn signed_temperature_rejects_unparseable_dash_positions() {
        assert!(is_signed_decimal("1-2"));
        assert_eq!(signed_temperature("1-2"), None);
        assert_eq!(signed_temperature("-0.5"), Some(-0.5));
        assert_eq!(unsigned_temperature("-0.5"), None);
        assert_eq!(unsigned_temperature("28.4"), Some(28.4));
    }
}
