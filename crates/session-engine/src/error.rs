//! Error types for session-engine operations.

use chrono::NaiveTime;
use thiserror::Error;

/// Structural input errors. Conflicts are never reported through this type:
/// they are ordinary data in [`crate::ConflictResult`] and
/// [`crate::RecurrenceResult`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval { start: NaiveTime, end: NaiveTime },

    #[error("Recurrence needs at least one weekday")]
    EmptyWeekdaySet,

    #[error("Recurrence needs a repeat count of at least one week")]
    NonPositiveRepeatCount,

    #[error("Invalid weekday index {0} (expected 0-6, Monday = 0)")]
    InvalidWeekday(u8),

    #[error("Requested {requested} occurrences, limit is {limit}")]
    LimitExceeded { requested: usize, limit: usize },

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Unparseable time: '{0}'")]
    UnparseableTime(String),

    #[error("Unparseable date: '{0}'")]
    UnparseableDate(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
