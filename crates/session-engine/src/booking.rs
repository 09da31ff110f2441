//! Booking model: one scheduled occupancy of a subject's agenda.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::parse;

/// A wall-clock time as read from storage.
///
/// Times that fail to parse keep their raw text so that the resolver's
/// fail-open behaviour on malformed data is an explicit state rather than an
/// accidental midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClockTime {
    At(NaiveTime),
    Unparseable(String),
}

impl ClockTime {
    /// Parse `HH:MM` text. Never fails: bad input becomes `Unparseable`.
    pub fn parse(s: &str) -> Self {
        match parse::parse_time(s) {
            Ok(t) => ClockTime::At(t),
            Err(_) => ClockTime::Unparseable(s.to_string()),
        }
    }

    /// The usable time, if any.
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            ClockTime::At(t) => Some(*t),
            ClockTime::Unparseable(_) => None,
        }
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(t: NaiveTime) -> Self {
        ClockTime::At(t)
    }
}

impl From<String> for ClockTime {
    fn from(s: String) -> Self {
        ClockTime::parse(&s)
    }
}

impl From<ClockTime> for String {
    fn from(c: ClockTime) -> Self {
        match c {
            ClockTime::At(t) => parse::format_time(t),
            ClockTime::Unparseable(raw) => raw,
        }
    }
}

/// Lifecycle status of a session.
///
/// Only `Cancelled` matters to conflict detection; every other status occupies
/// the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    NoShow,
    Cancelled,
}

impl BookingStatus {
    /// Parse a status label, case-insensitively.
    ///
    /// Accepts the English names and the labels written by the clinic's agenda
    /// (`Agendada`, `Confirmada`, `Realizada`, `Falta`, `Cancelada`). Unknown
    /// labels map to `Scheduled` so that they keep blocking the slot.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "cancelled" | "canceled" | "cancelada" | "cancelado" => BookingStatus::Cancelled,
            "confirmed" | "confirmada" => BookingStatus::Confirmed,
            "completed" | "realizada" => BookingStatus::Completed,
            "no_show" | "noshow" | "no-show" | "falta" => BookingStatus::NoShow,
            "scheduled" | "agendada" | "" => BookingStatus::Scheduled,
            other => {
                log::debug!("unknown booking status '{}', treating as scheduled", other);
                BookingStatus::Scheduled
            }
        }
    }

    /// Stable identifier used in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::NoShow => "no_show",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Label written to the agenda's status column.
    pub fn sheet_label(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "Agendada",
            BookingStatus::Confirmed => "Confirmada",
            BookingStatus::Completed => "Realizada",
            BookingStatus::NoShow => "Falta",
            BookingStatus::Cancelled => "Cancelada",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BookingStatus::Cancelled)
    }
}

impl From<String> for BookingStatus {
    fn from(s: String) -> Self {
        BookingStatus::from_label(&s)
    }
}

impl From<BookingStatus> for String {
    fn from(s: BookingStatus) -> Self {
        s.as_str().to_string()
    }
}

/// Free-text annotations carried along with a session.
///
/// Copied verbatim onto generated bookings; never consulted by conflict logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDetails {
    pub professional: String,
    /// Session kind, e.g. therapy, evaluation, follow-up.
    pub kind: String,
    pub goals: String,
    pub notes: String,
    pub attachments_url: String,
}

/// One scheduled occupancy of a subject's agenda on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInterval {
    /// Storage identifier. `None` until the booking is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The entity scheduled against (e.g. a patient id). Conflicts are only
    /// evaluated between bookings sharing this key.
    pub subject_key: String,
    pub date: NaiveDate,
    pub start: ClockTime,
    /// Absent for a point booking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<ClockTime>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub details: SessionDetails,
}

impl BookingInterval {
    /// Build a validated booking with `Scheduled` status and no annotations.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidInterval` if `end` is present and not
    /// strictly after `start`.
    pub fn new(
        subject_key: impl Into<String>,
        date: NaiveDate,
        start: NaiveTime,
        end: Option<NaiveTime>,
    ) -> Result<Self> {
        validate_times(start, end)?;
        Ok(Self {
            id: None,
            subject_key: subject_key.into(),
            date,
            start: ClockTime::At(start),
            end: end.map(ClockTime::At),
            status: BookingStatus::Scheduled,
            details: SessionDetails::default(),
        })
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_details(mut self, details: SessionDetails) -> Self {
        self.details = details;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn start_time(&self) -> Option<NaiveTime> {
        self.start.time()
    }

    /// The usable end time. An unparseable end counts as absent.
    pub fn end_time(&self) -> Option<NaiveTime> {
        self.end.as_ref().and_then(ClockTime::time)
    }

    /// True when the booking has no usable end time.
    pub fn is_point(&self) -> bool {
        self.end_time().is_none()
    }

    /// Check the interval invariant on a booking built from raw fields.
    ///
    /// Bookings whose start is unparseable pass: there is nothing to compare.
    pub fn validate(&self) -> Result<()> {
        match self.start_time() {
            Some(start) => validate_times(start, self.end_time()),
            None => Ok(()),
        }
    }
}

/// Reject an interval whose end is not strictly after its start.
pub fn validate_times(start: NaiveTime, end: Option<NaiveTime>) -> Result<()> {
    match end {
        Some(end) if end <= start => Err(ScheduleError::InvalidInterval { start, end }),
        _ => Ok(()),
    }
}
