//! Monthly temperature statistics over parsed daily records.
//!
//! Values that are missing or not convertible are left out of both the sum
//! and the count; they are never treated as zero.

use weather_compare_weather_models::DailyRecord;

use crate::parsing::{signed_temperature, unsigned_temperature};

/// Arithmetic mean of every temperature passing the signed check.
#[must_use]
pub fn average_temperature(records: &[DailyRecord]) -> Option<f64> {
    let temps: Vec<f64> = records
        .iter()
        .filter_map(|r| r.temperature.as_deref().and_then(signed_temperature))
        .collect();

    if temps.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let count = temps.len() as f64;
    Some(temps.iter().sum::<f64>() / count)
}

/// Maximum of every temperature passing the unsigned check.
///
/// Negative readings fail that check, so a month with only sub-zero days
/// has no maximum.
#[must_use]
pub fn highest_temperature(records: &[DailyRecord]) -> Option<f64> {
    records
        .iter()
        .filter_map(|r| r.temperature.as_deref().and_then(unsigned_temperature))
        .reduce(f64::max)
}

/// First record whose weather label equals `weather` exactly.
#[must_use]
pub fn find_similar_weather(records: Vec<DailyRecord>, weather: &str) -> Option<DailyRecord> {
    records
        .into_iter()
        .find(|r| r.weather.as_deref() == Some(weather))
}
