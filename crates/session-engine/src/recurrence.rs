//! Recurring series generation -- turns a weekly pattern into concrete bookings,
//! splitting them into accepted and skipped slots.
//!
//! Generation is aligned to calendar weeks: the series starts at the Monday of
//! the week containing `start_date`, then walks `repeat_weeks` weeks, emitting
//! one candidate per requested weekday. Each candidate is checked against the
//! existing bookings plus everything already accepted in the same run.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::booking::{validate_times, BookingInterval, BookingStatus, ClockTime, SessionDetails};
use crate::config::ResolverConfig;
use crate::conflict::check_against;
use crate::error::{Result, ScheduleError};

/// A weekly pattern to expand into bookings. Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRequest {
    pub subject_key: String,
    /// Any date inside the first week of the series.
    pub start_date: NaiveDate,
    /// Weekdays to book each week. Order and duplicates do not matter.
    pub weekdays: Vec<Weekday>,
    pub start: NaiveTime,
    #[serde(default)]
    pub end: Option<NaiveTime>,
    /// Number of weeks to generate, at least 1.
    pub repeat_weeks: u32,
    /// Status copied onto every generated booking.
    #[serde(default)]
    pub status: BookingStatus,
    /// Annotations copied onto every generated booking.
    #[serde(default)]
    pub details: SessionDetails,
}

impl RecurrenceRequest {
    pub fn new(
        subject_key: impl Into<String>,
        start_date: NaiveDate,
        weekdays: Vec<Weekday>,
        start: NaiveTime,
        end: Option<NaiveTime>,
        repeat_weeks: u32,
    ) -> Self {
        Self {
            subject_key: subject_key.into(),
            start_date,
            weekdays,
            start,
            end,
            repeat_weeks,
            status: BookingStatus::Scheduled,
            details: SessionDetails::default(),
        }
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_details(mut self, details: SessionDetails) -> Self {
        self.details = details;
        self
    }

    /// Requested weekdays, deduplicated, Monday first.
    pub fn sorted_weekdays(&self) -> Vec<Weekday> {
        let mut days = self.weekdays.clone();
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        days
    }

    /// Number of candidates this request generates.
    pub fn occurrence_count(&self) -> usize {
        (self.repeat_weeks as usize).saturating_mul(self.sorted_weekdays().len())
    }

    fn candidate(&self, date: NaiveDate) -> BookingInterval {
        BookingInterval {
            id: None,
            subject_key: self.subject_key.clone(),
            date,
            start: ClockTime::At(self.start),
            end: self.end.map(ClockTime::At),
            status: self.status,
            details: self.details.clone(),
        }
    }
}

/// A generated slot that could not be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSlot {
    pub date: NaiveDate,
    /// The bookings that occupy the slot.
    pub conflicts: Vec<BookingInterval>,
}

/// Partitioned outcome of a recurring request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceResult {
    /// Bookings free to persist, in generation order.
    pub accepted: Vec<BookingInterval>,
    /// Slots dropped because of conflicts, in generation order.
    pub skipped: Vec<SkippedSlot>,
}

impl RecurrenceResult {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.skipped.len()
    }

    /// Human-readable outcome, e.g. "12 of 14 sessions booked, 2 skipped".
    pub fn summary(&self) -> String {
        format!(
            "{} of {} sessions booked, {} skipped",
            self.accepted.len(),
            self.total(),
            self.skipped.len()
        )
    }
}

/// Map a weekday index (0-6, Monday = 0) to a `Weekday`.
///
/// # Errors
/// Returns `ScheduleError::InvalidWeekday` for indices above 6.
pub fn weekday_from_index(index: u8) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Mon),
        1 => Ok(Weekday::Tue),
        2 => Ok(Weekday::Wed),
        3 => Ok(Weekday::Thu),
        4 => Ok(Weekday::Fri),
        5 => Ok(Weekday::Sat),
        6 => Ok(Weekday::Sun),
        other => Err(ScheduleError::InvalidWeekday(other)),
    }
}

/// The Monday that begins the calendar week containing `date`.
pub fn week_anchor(date: NaiveDate) -> Result<NaiveDate> {
    let back = Duration::days(date.weekday().num_days_from_monday() as i64);
    date.checked_sub_signed(back)
        .ok_or_else(|| ScheduleError::DateOutOfRange(date.to_string()))
}

/// Lazily produce the candidate dates: week by week, weekdays ascending.
///
/// `weekdays` must already be sorted and deduplicated.
fn candidate_dates(
    anchor: NaiveDate,
    weekdays: Vec<Weekday>,
    repeat_weeks: u32,
) -> impl Iterator<Item = NaiveDate> {
    (0..repeat_weeks as i64).flat_map(move |week| {
        weekdays
            .clone()
            .into_iter()
            .map(move |wd| anchor + Duration::days(7 * week + wd.num_days_from_monday() as i64))
    })
}

/// Expand a recurring request against existing bookings using the default
/// [`ResolverConfig`].
///
/// See [`generate_recurring_with_config`].
pub fn generate_recurring(
    existing: &[BookingInterval],
    request: &RecurrenceRequest,
) -> Result<RecurrenceResult> {
    generate_recurring_with_config(existing, request, &ResolverConfig::default())
}

/// Expand a recurring request against existing bookings.
///
/// Every candidate lands in exactly one of `accepted` or `skipped`, so
/// `accepted.len() + skipped.len() == repeat_weeks * |weekdays|`. Accepted
/// bookings never overlap each other or any non-cancelled existing booking.
/// Candidates falling before `start_date` inside the first week are kept.
///
/// # Arguments
/// - `existing` -- snapshot of stored bookings; not mutated
/// - `request` -- the weekly pattern
/// - `config` -- series size limit
///
/// # Errors
/// Returns `ScheduleError::EmptyWeekdaySet` if no weekday is requested.
/// Returns `ScheduleError::NonPositiveRepeatCount` if `repeat_weeks` is 0.
/// Returns `ScheduleError::InvalidInterval` if `end` is not after `start`.
/// Returns `ScheduleError::LimitExceeded` if the series exceeds `config.max_occurrences`.
/// Returns `ScheduleError::DateOutOfRange` if the series runs past chrono's date range.
pub fn generate_recurring_with_config(
    existing: &[BookingInterval],
    request: &RecurrenceRequest,
    config: &ResolverConfig,
) -> Result<RecurrenceResult> {
    // Validate inputs before generating anything.
    let weekdays = request.sorted_weekdays();
    if weekdays.is_empty() {
        return Err(ScheduleError::EmptyWeekdaySet);
    }
    if request.repeat_weeks == 0 {
        return Err(ScheduleError::NonPositiveRepeatCount);
    }
    validate_times(request.start, request.end)?;

    let requested = request.occurrence_count();
    if requested > config.max_occurrences {
        return Err(ScheduleError::LimitExceeded {
            requested,
            limit: config.max_occurrences,
        });
    }

    let anchor = week_anchor(request.start_date)?;
    // The last candidate must be representable before the iterator adds days.
    let last_weekday = weekdays
        .last()
        .map(|wd| wd.num_days_from_monday() as i64)
        .unwrap_or(0);
    let last_offset = 7 * (request.repeat_weeks as i64 - 1) + last_weekday;
    anchor
        .checked_add_signed(Duration::days(last_offset))
        .ok_or_else(|| ScheduleError::DateOutOfRange(request.start_date.to_string()))?;

    let result = candidate_dates(anchor, weekdays, request.repeat_weeks)
        .map(|date| request.candidate(date))
        .fold(RecurrenceResult::default(), |mut acc, candidate| {
            let check = check_against(existing.iter().chain(acc.accepted.iter()), &candidate);
            if check.ok {
                log::debug!("{}: {} free", candidate.subject_key, candidate.date);
                acc.accepted.push(candidate);
            } else {
                log::debug!(
                    "{}: {} skipped, {} conflict(s)",
                    candidate.subject_key,
                    candidate.date,
                    check.conflicts.len()
                );
                acc.skipped.push(SkippedSlot {
                    date: candidate.date,
                    conflicts: check.conflicts,
                });
            }
            acc
        });

    log::info!("{}: {}", request.subject_key, result.summary());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn anchor_of_monday_is_itself() {
        assert_eq!(week_anchor(d(2025, 1, 6)).unwrap(), d(2025, 1, 6));
    }

    #[test]
    fn anchor_of_sunday_is_previous_monday() {
        assert_eq!(week_anchor(d(2025, 1, 12)).unwrap(), d(2025, 1, 6));
    }

    #[test]
    fn anchor_crosses_year_boundary() {
        // 2025-01-01 is a Wednesday.
        assert_eq!(week_anchor(d(2025, 1, 1)).unwrap(), d(2024, 12, 30));
    }

    #[test]
    fn candidates_walk_weeks_then_weekdays() {
        let dates: Vec<NaiveDate> =
            candidate_dates(d(2025, 1, 6), vec![Weekday::Tue, Weekday::Thu], 2).collect();
        assert_eq!(
            dates,
            vec![d(2025, 1, 7), d(2025, 1, 9), d(2025, 1, 14), d(2025, 1, 16)]
        );
    }

    #[test]
    fn weekdays_are_sorted_and_deduplicated() {
        let req = RecurrenceRequest::new(
            "P1",
            d(2025, 1, 6),
            vec![Weekday::Fri, Weekday::Mon, Weekday::Fri],
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            None,
            3,
        );
        assert_eq!(req.sorted_weekdays(), vec![Weekday::Mon, Weekday::Fri]);
        assert_eq!(req.occurrence_count(), 6);
    }
}
