//! Date parsing and conversion.

use chrono::NaiveDateTime;
use famafrench_primitives::Date;
use serde::Deserialize;

use crate::UtilsError;

/// Input formats accepted by every loader, tried in order.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Timestamp format whose time component is discarded.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses date text from input files into [`Date`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DateParser;

impl DateParser {
    /// Parse a date, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns [`UtilsError::InvalidDate`] if no accepted format matches.
    pub fn parse(text: &str) -> Result<Date, UtilsError> {
        let text = text.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| Date::parse_from_str(text, fmt).ok())
            .or_else(|| NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).ok().map(|dt| dt.date()))
            .ok_or_else(|| UtilsError::InvalidDate(text.to_string()))
    }

    /// Parse an optional cell; `None` and empty text stay `None`.
    ///
    /// # Errors
    /// Returns [`UtilsError::InvalidDate`] for non-empty unparseable text.
    pub fn parse_opt(text: Option<&str>) -> Result<Option<Date>, UtilsError> {
        match text.map(str::trim) {
            None | Some("") => Ok(None),
            Some(t) => Self::parse(t).map(Some),
        }
    }
}

fn epoch() -> Date {
    Date::default()
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
#[must_use]
pub fn date_to_days(date: Date) -> i32 {
    (date - epoch()).num_days() as i32
}

/// Inverse of [`date_to_days`].
#[must_use]
pub fn days_to_date(days: i32) -> Date {
    epoch() + chrono::Duration::days(i64::from(days))
}

/// `YYYYMMDD` stamp used in output file names.
#[must_use]
pub fn date_stamp(date: Date) -> String {
    date.format("%Y%m%d").to_string()
}

/// Inclusive date range applied to every bar loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    /// First date kept.
    pub start: Date,
    /// Last date kept.
    pub end: Date,
}

impl DateRange {
    /// Create a range.
    ///
    /// # Errors
    /// Returns [`UtilsError::InvalidParameter`] if `start > end`.
    pub fn new(start: Date, end: Date) -> Result<Self, UtilsError> {
        if start > end {
            return Err(UtilsError::InvalidParameter(format!("range start {start} after end {end}")));
        }
        Ok(Self { start, end })
    }

    /// Range covering every representable date.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { start: Date::MIN, end: Date::MAX }
    }

    /// Check if a date lies inside the range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::unbounded()
    }
}
