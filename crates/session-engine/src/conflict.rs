//! Detect overlapping bookings for a single subject on a single day.
//!
//! Bookings with both ends known are compared as half-open `[start, end)`
//! intervals, so back-to-back sessions (one ends exactly when the next starts)
//! are NOT conflicts. When either side is a point booking, only an identical
//! start time is a conflict. Cancelled bookings never conflict.

use serde::{Deserialize, Serialize};

use crate::booking::BookingInterval;

/// Outcome of checking one proposed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResult {
    /// True iff `conflicts` is empty.
    pub ok: bool,
    /// Every existing booking that collides with the proposal, in input order.
    pub conflicts: Vec<BookingInterval>,
}

/// Decide whether two bookings, already known to share subject and date, overlap.
///
/// - both ends known: `!(end_a <= start_b || start_a >= end_b)`
/// - either end unknown: `start_a == start_b`
/// - either start unparseable: never (fail open)
pub fn intervals_overlap(a: &BookingInterval, b: &BookingInterval) -> bool {
    let (Some(start_a), Some(start_b)) = (a.start_time(), b.start_time()) else {
        return false;
    };

    match (a.end_time(), b.end_time()) {
        (Some(end_a), Some(end_b)) => !(end_a <= start_b || start_a >= end_b),
        _ => start_a == start_b,
    }
}

/// Minutes of overlap between two fully timed bookings.
///
/// The overlap duration is `min(end_a, end_b) - max(start_a, start_b)`.
/// Returns `None` when either booking lacks a usable start or end, or when
/// they do not overlap.
pub fn overlap_minutes(a: &BookingInterval, b: &BookingInterval) -> Option<i64> {
    let (start_a, end_a) = (a.start_time()?, a.end_time()?);
    let (start_b, end_b) = (b.start_time()?, b.end_time()?);

    if start_a < end_b && start_b < end_a {
        let overlap_start = start_a.max(start_b);
        let overlap_end = end_a.min(end_b);
        Some((overlap_end - overlap_start).num_minutes())
    } else {
        None
    }
}

/// Check a proposed booking against a snapshot of existing bookings.
///
/// Only bookings for the same subject on the same date are considered, and
/// cancelled bookings are skipped regardless of time. All colliding bookings
/// are collected, not just the first.
///
/// The proposal is not re-validated; build it through
/// [`BookingInterval::new`] or call [`BookingInterval::validate`] first.
pub fn check_single(existing: &[BookingInterval], proposed: &BookingInterval) -> ConflictResult {
    check_against(existing, proposed)
}

/// [`check_single`] over any iterator of bookings, so callers can chain a
/// stored snapshot with bookings accepted earlier in the same run.
pub(crate) fn check_against<'a, I>(existing: I, proposed: &BookingInterval) -> ConflictResult
where
    I: IntoIterator<Item = &'a BookingInterval>,
{
    if proposed.start_time().is_none() {
        log::warn!(
            "proposed booking for '{}' on {} has an unparseable start; no conflict can be detected",
            proposed.subject_key,
            proposed.date
        );
    }

    let conflicts: Vec<BookingInterval> = existing
        .into_iter()
        .filter(|b| b.subject_key == proposed.subject_key && b.date == proposed.date)
        .filter(|b| {
            if b.status.is_cancelled() {
                log::debug!("ignoring cancelled booking {:?} at {:?}", b.id, b.start);
                return false;
            }
            if b.start_time().is_none() {
                log::warn!(
                    "existing booking {:?} for '{}' on {} has unparseable start {:?}; ignored",
                    b.id,
                    b.subject_key,
                    b.date,
                    b.start
                );
            }
            true
        })
        .filter(|b| intervals_overlap(b, proposed))
        .cloned()
        .collect();

    ConflictResult {
        ok: conflicts.is_empty(),
        conflicts,
    }
}
