//! Parsing of the textual time and date formats found in the clinic's agenda.
//!
//! Times are `HH:MM` wall-clock values in clinic-local time. Dates are stored
//! as `DD/MM/YYYY`, but hand-edited rows also carry `YYYY-MM-DD`, `DD-MM-YYYY`
//! and `YYYY/MM/DD`, so all four are accepted on input.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::error::{Result, ScheduleError};

/// Accepted date layouts, tried in order.
const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];

/// Years must be written with four digits; chrono's `%Y` alone accepts `25`.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=9999;

/// Layout used when writing dates back to the agenda.
pub const SHEET_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse an `HH:MM` time of day.
///
/// Single-digit hours (`9:05`) and a trailing seconds field (`09:05:30`) are
/// tolerated. Seconds are discarded: all times have minute precision.
///
/// # Errors
/// Returns `ScheduleError::UnparseableTime` for empty or malformed input.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ScheduleError::UnparseableTime(s.to_string()));
    }

    let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ScheduleError::UnparseableTime(s.to_string()))?;

    NaiveTime::from_hms_opt(parsed.hour(), parsed.minute(), 0)
        .ok_or_else(|| ScheduleError::UnparseableTime(s.to_string()))
}

/// Parse a calendar date in any of the accepted layouts.
///
/// # Errors
/// Returns `ScheduleError::UnparseableDate` when no layout matches or the
/// year is not a four-digit year (`14/01/25` is rejected, not read as 0025).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .find(|d| YEAR_RANGE.contains(&d.year()))
        .ok_or_else(|| ScheduleError::UnparseableDate(s.to_string()))
}

/// Format a date as `DD/MM/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(SHEET_DATE_FORMAT).to_string()
}

/// Format a time as `HH:MM`.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
