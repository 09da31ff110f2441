//! Conversion between bookings and rows of the clinic's sessions sheet.
//!
//! The sheet is edited by hand, so every cell is text and any of them may be
//! malformed. Rows are converted one at a time and failures are reported per
//! row instead of aborting the whole load.

use serde::{Deserialize, Serialize};

use crate::booking::{BookingInterval, BookingStatus, ClockTime, SessionDetails};
use crate::error::{Result, ScheduleError};
use crate::parse;

/// One row of the sessions sheet, keyed by the sheet's column headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRow {
    #[serde(rename = "SessaoID")]
    pub session_id: String,
    #[serde(rename = "PacienteID")]
    pub patient_id: String,
    #[serde(rename = "Data")]
    pub date: String,
    #[serde(rename = "HoraInicio")]
    pub start: String,
    #[serde(rename = "HoraFim")]
    pub end: String,
    #[serde(rename = "Profissional")]
    pub professional: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Tipo")]
    pub kind: String,
    #[serde(rename = "ObjetivosTrabalhados")]
    pub goals: String,
    #[serde(rename = "Observacoes")]
    pub notes: String,
    #[serde(rename = "AnexosURL")]
    pub attachments_url: String,
}

/// A row that could not be turned into a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// Zero-based position of the row in the input.
    pub index: usize,
    pub error: ScheduleError,
}

impl SessionRow {
    /// Convert the row into a booking.
    ///
    /// Times are parsed leniently: an unparseable start or end stays visible as
    /// [`ClockTime::Unparseable`]. An empty end cell makes a point booking.
    ///
    /// # Errors
    /// Returns `ScheduleError::UnparseableDate` if the date cell is malformed.
    /// Returns `ScheduleError::InvalidInterval` if both times parse and the end
    /// is not after the start.
    pub fn into_booking(self) -> Result<BookingInterval> {
        let date = parse::parse_date(&self.date)?;
        let end = if self.end.trim().is_empty() {
            None
        } else {
            Some(ClockTime::parse(&self.end))
        };
        let id = match self.session_id.trim() {
            "" => None,
            id => Some(id.to_string()),
        };

        let booking = BookingInterval {
            id,
            subject_key: self.patient_id.trim().to_string(),
            date,
            start: ClockTime::parse(&self.start),
            end,
            status: BookingStatus::from_label(&self.status),
            details: SessionDetails {
                professional: self.professional,
                kind: self.kind,
                goals: self.goals,
                notes: self.notes,
                attachments_url: self.attachments_url,
            },
        };
        booking.validate()?;
        Ok(booking)
    }

    /// Render a booking in the sheet's layout.
    pub fn from_booking(booking: &BookingInterval) -> Self {
        Self {
            session_id: booking.id.clone().unwrap_or_default(),
            patient_id: booking.subject_key.clone(),
            date: parse::format_date(booking.date),
            start: booking.start.clone().into(),
            end: booking.end.clone().map(String::from).unwrap_or_default(),
            professional: booking.details.professional.clone(),
            status: booking.status.sheet_label().to_string(),
            kind: booking.details.kind.clone(),
            goals: booking.details.goals.clone(),
            notes: booking.details.notes.clone(),
            attachments_url: booking.details.attachments_url.clone(),
        }
    }
}

/// Convert a whole sheet export, collecting bad rows separately.
pub fn load_bookings(rows: Vec<SessionRow>) -> (Vec<BookingInterval>, Vec<RowError>) {
    let mut bookings = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        match row.into_booking() {
            Ok(b) => bookings.push(b),
            Err(error) => {
                log::warn!("skipping session row {}: {}", index, error);
                errors.push(RowError { index, error });
            }
        }
    }

    (bookings, errors)
}
