//! # slot-engine
//!
//! Availability and recurrence engine for practice scheduling: given a
//! resource's schedule definition, a date, and a snapshot of existing
//! bookings, it computes which slots are bookable, detects conflicts for
//! ad-hoc time blocks, and expands repeat rules into concrete occurrence
//! dates.
//!
//! The engine is pure computation over already-fetched data — no I/O, no
//! clock reads, no persistence. Storage and schedule configuration live
//! behind the [`engine::ScheduleSource`] and [`engine::BookingStore`]
//! traits.
//!
//! ## Modules
//!
//! - [`timeutil`] — wall-clock arithmetic and half-open interval overlap
//! - [`slots`] — schedule definition → candidate slots for a date
//! - [`conflict`] — the booking conflict evaluator and window checks
//! - [`recurrence`] — repeat rule → ordered occurrence dates with conflict flags
//! - [`unavailability`] — synthetic zero-patient bookings that block time
//! - [`engine`] — the query facade tying the above to external stores
//! - [`snapshot`] — JSON-backed in-memory store for tests and the CLI
//! - [`types`] / [`error`] — data model and error taxonomy

pub mod conflict;
pub mod engine;
pub mod error;
pub mod recurrence;
pub mod slots;
pub mod snapshot;
pub mod timeutil;
pub mod types;
pub mod unavailability;

pub use conflict::{check_conflicts, evaluate_slot, ConflictPolicy};
pub use engine::{BookingStore, Engine, EngineConfig, ScheduleSource};
pub use error::{EngineError, Result};
pub use recurrence::{expand, OCCURRENCE_CEILING};
pub use slots::generate_candidates;
pub use snapshot::Snapshot;
pub use types::{
    AppointmentKind, Booking, BookingMode, BookingStatus, CandidateSlot, EndCondition, Frequency,
    Occurrence, RecurrenceRule, ScheduleSlot, TimeRange, WeekdaySet,
};
