//! # session-engine
//!
//! Recurring session scheduling with per-patient conflict detection.
//!
//! The engine decides, for a proposed session or a weekly series of sessions,
//! which slots are free and which collide with a patient's existing bookings.
//! It performs no I/O: callers load the existing agenda, run the resolver on
//! that snapshot, and persist what was accepted.
//!
//! ## Modules
//!
//! - [`booking`] — Booking model, statuses, and tolerant time values
//! - [`conflict`] — Overlap rule and single-booking conflict check
//! - [`recurrence`] — Weekly series generation split into accepted/skipped
//! - [`parse`] — `HH:MM` and `DD/MM/YYYY` parsing
//! - [`row`] — Conversion to and from rows of the sessions sheet
//! - [`ids`] — Session id assignment for persisted bookings
//! - [`config`] — Resolver limits, loadable from TOML
//! - [`error`] — Error types

pub mod booking;
pub mod config;
pub mod conflict;
pub mod error;
pub mod ids;
pub mod parse;
pub mod recurrence;
pub mod row;

pub use booking::{BookingInterval, BookingStatus, ClockTime, SessionDetails};
pub use config::ResolverConfig;
pub use conflict::{check_single, intervals_overlap, ConflictResult};
pub use error::ScheduleError;
pub use recurrence::{
    generate_recurring, generate_recurring_with_config, weekday_from_index, RecurrenceRequest,
    RecurrenceResult, SkippedSlot,
};
pub use row::{load_bookings, SessionRow};
