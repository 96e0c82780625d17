//! Range-checked inputs for the custom window lookups.

use std::str::FromStr;

/// Largest number of weeks a custom window may cover.
pub const MAX_WEEKS: i64 = 52;

/// Largest number of years a custom lookup may go back.
pub const MAX_YEARS: i64 = 100;

/// Largest day-by-day window, the same span as [`MAX_WEEKS`] weeks.
pub const MAX_WINDOW_DAYS: u32 = 364;

/// Caller input outside the accepted range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `weeks` outside `1..=52`.
    #[error("weeks must be between 1 and 52 (got {0})")]
    WeeksOutOfRange(i64),

    /// `years` outside `0..=100`.
    #[error("years must be between 0 and 100 (got {0})")]
    YearsOutOfRange(i64),

    /// `weeks` is not an integer that fits in an `i64`.
    #[error("weeks must be between 1 and 52 (got {0})")]
    InvalidWeeks(String),

    /// `years` is not an integer that fits in an `i64`.
    #[error("years must be between 0 and 100 (got {0})")]
    InvalidYears(String),
}

/// Number of weeks in a custom window, `1..=52`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCount(u32);

impl WeekCount {
    /// Validates a raw week count.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::WeeksOutOfRange`] outside `1..=52`.
    pub fn new(weeks: i64) -> Result<Self, ValidationError> {
        if (1..=MAX_WEEKS).contains(&weeks) {
            u32::try_from(weeks)
                .map(Self)
                .map_err(|_| ValidationError::WeeksOutOfRange(weeks))
        } else {
            Err(ValidationError::WeeksOutOfRange(weeks))
        }
    }

    /// Number of weeks.
    #[must_use]
    pub const fn weeks(self) -> u32 {
        self.0
    }

    /// Number of days covered.
    #[must_use]
    pub const fn days(self) -> u32 {
        self.0 * 7
    }
}

impl FromStr for WeekCount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let weeks = s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidWeeks(s.to_owned()))?;
        Self::new(weeks)
    }
}

/// Number of years back for a custom lookup, `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearCount(u32);

impl YearCount {
    /// Validates a raw year count.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::YearsOutOfRange`] outside `0..=100`.
    pub fn new(years: i64) -> Result<Self, ValidationError> {
        if (0..=MAX_YEARS).contains(&years) {
            u32::try_from(years)
                .map(Self)
                .map_err(|_| ValidationError::YearsOutOfRange(years))
        } else {
            Err(ValidationError::YearsOutOfRange(years))
        }
    }

    /// Number of years.
    #[must_use]
    pub const fn years(self) -> u32 {
        self.0
    }
}

impl FromStr for YearCount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let years = s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidYears(s.to_owned()))?;
        Self::new(years)
    }
}
