//! Session identifiers in the agenda's `PREFIX-YYYYmmddHHMMSSmmm` layout.

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::booking::BookingInterval;

/// Prefix used for session ids.
pub const SESSION_PREFIX: &str = "S";

/// Issues timestamp-based ids that are strictly increasing.
///
/// Ids carry millisecond precision. When a batch is written within the same
/// millisecond, each further id is bumped one millisecond past the previous.
#[derive(Debug, Clone)]
pub struct SessionIdGenerator {
    prefix: String,
    last: Option<NaiveDateTime>,
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self::new(SESSION_PREFIX)
    }
}

impl SessionIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last: None,
        }
    }

    /// Issue the next id for a write happening at `now` (clinic-local time).
    pub fn next_id(&mut self, now: NaiveDateTime) -> String {
        let truncated = truncate_to_millis(now);
        let stamp = match self.last {
            Some(last) if truncated <= last => last + Duration::milliseconds(1),
            _ => truncated,
        };
        self.last = Some(stamp);
        format!("{}-{}", self.prefix, stamp.format("%Y%m%d%H%M%S%3f"))
    }
}

fn truncate_to_millis(t: NaiveDateTime) -> NaiveDateTime {
    let nanos = t.nanosecond() / 1_000_000 * 1_000_000;
    t.with_nanosecond(nanos).unwrap_or(t)
}

/// Give every booking that lacks one a fresh id.
pub fn assign_ids(
    bookings: &mut [BookingInterval],
    generator: &mut SessionIdGenerator,
    now: NaiveDateTime,
) {
    for booking in bookings.iter_mut().filter(|b| b.id.is_none()) {
        booking.id = Some(generator.next_id(now));
    }
}
