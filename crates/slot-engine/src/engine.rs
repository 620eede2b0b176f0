//! Caller-facing query surface over external schedule and booking sources.
//!
//! The engine itself is pure computation: every query fetches one snapshot
//! from the collaborators and derives its answer from that. The only write
//! paths are unavailability creation and cancellation, and creation
//! re-validates against a fresh snapshot immediately before the insert so a
//! booking that slipped in between the check and the commit surfaces as a
//! retryable [`EngineError::StaleSnapshot`] instead of a double booking.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::conflict::{self, ConflictPolicy};
use crate::error::{EngineError, Result};
use crate::recurrence;
use crate::slots;
use crate::types::{
    AppointmentKind, Booking, BookingStatus, CandidateSlot, Occurrence, RecurrenceRule,
    ScheduleSlot, TimeRange,
};
use crate::unavailability;

/// Source of schedule definitions: the ordered slot templates for a
/// resource on a weekday.
pub trait ScheduleSource {
    /// # Errors
    /// `NotFound` for an unknown resource. A resource with no slots on the
    /// given weekday returns an empty list, not an error.
    fn schedule_for(&self, resource: &str, weekday: Weekday) -> Result<Vec<ScheduleSlot>>;
}

/// Source of booking snapshots plus the two write operations the engine
/// needs. Each `bookings_for` call is one snapshot; the engine never assumes
/// two calls agree.
pub trait BookingStore {
    fn bookings_for(&self, resource: &str, date: NaiveDate) -> Result<Vec<Booking>>;

    fn insert(&mut self, resource: &str, booking: Booking) -> Result<()>;

    fn set_status(
        &mut self,
        resource: &str,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub policy: ConflictPolicy,
}

/// Availability & recurrence engine bound to a schedule source and a
/// booking store.
pub struct Engine<S, B> {
    schedules: S,
    store: B,
    config: EngineConfig,
}

impl<S: ScheduleSource, B: BookingStore> Engine<S, B> {
    pub fn new(schedules: S, store: B) -> Self {
        Self::with_config(schedules, store, EngineConfig::default())
    }

    pub fn with_config(schedules: S, store: B, config: EngineConfig) -> Self {
        Self {
            schedules,
            store,
            config,
        }
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    /// Candidate slots for a resource on a date, evaluated against the
    /// current booking snapshot. Slot order follows the schedule definition.
    ///
    /// `now` is supplied by the caller so queries stay deterministic; it
    /// only matters for the past-slot guard when `date` is today.
    pub fn available_slots(
        &self,
        resource: &str,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Vec<CandidateSlot>> {
        let schedule = self.schedules.schedule_for(resource, date.weekday())?;
        let bookings = self.store.bookings_for(resource, date)?;
        slots::generate_candidates(&schedule, date)?
            .into_iter()
            .map(|candidate| conflict::evaluate_slot(candidate, &bookings, now, self.config.policy))
            .collect()
    }

    /// Bookings colliding with `[from_time, to_time)` on `date`. Empty means
    /// the window is free.
    pub fn check_conflicts(
        &self,
        resource: &str,
        date: NaiveDate,
        from_time: NaiveTime,
        to_time: NaiveTime,
    ) -> Result<Vec<Booking>> {
        let bookings = self.store.bookings_for(resource, date)?;
        conflict::check_conflicts(&bookings, date, from_time, to_time, self.config.policy)
    }

    /// Expand a recurrence rule, marking each occurrence with the conflict
    /// verdict for the rule's window on that date. Read-only preview;
    /// committing occurrences as bookings is a separate step.
    pub fn expand_recurrence(
        &self,
        resource: &str,
        rule: &RecurrenceRule,
        now: NaiveDateTime,
    ) -> Result<Vec<Occurrence>> {
        recurrence::expand(rule, now, |date: NaiveDate, from: NaiveTime, to: NaiveTime| {
            let bookings = self.store.bookings_for(resource, date)?;
            let hits = conflict::check_conflicts(&bookings, date, from, to, self.config.policy)?;
            Ok(!hits.is_empty())
        })
    }

    /// Create an unavailability block over `[from_time, to_time)` on `date`.
    ///
    /// # Errors
    /// `Conflict` (with the colliding bookings) when the window holds any
    /// non-cancelled booking; `StaleSnapshot` when a booking appears between
    /// the conflict check and the commit.
    pub fn create_unavailability(
        &mut self,
        resource: &str,
        date: NaiveDate,
        from_time: NaiveTime,
        to_time: NaiveTime,
        reason: Option<String>,
    ) -> Result<Booking> {
        let range = TimeRange::new(from_time, to_time)?;
        let snapshot = self.store.bookings_for(resource, date)?;
        unavailability::ensure_window_free(&snapshot, date, range, self.config.policy)?;

        let booking = unavailability::build_unavailability(resource, date, range, reason)?;

        // Commit-time re-validation: the snapshot above may have gone stale.
        let fresh = self.store.bookings_for(resource, date)?;
        let late =
            conflict::check_conflicts(&fresh, date, range.from_time, range.to_time, self.config.policy)?;
        if !late.is_empty() {
            return Err(EngineError::StaleSnapshot(format!(
                "{} booking(s) appeared in {date} {from_time}–{to_time} before commit",
                late.len()
            )));
        }

        self.store.insert(resource, booking.clone())?;
        Ok(booking)
    }

    /// Cancel an unavailability block: a plain status transition to
    /// Cancelled. Nothing else is touched — cancelling a block never
    /// cascades to real bookings.
    ///
    /// # Errors
    /// `NotFound` for an unknown booking id; `Validation` when the id names
    /// a booking that is not an unavailability block.
    pub fn cancel_unavailability(
        &mut self,
        resource: &str,
        date: NaiveDate,
        booking_id: &str,
    ) -> Result<()> {
        let bookings = self.store.bookings_for(resource, date)?;
        let target = bookings
            .iter()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| EngineError::NotFound {
                kind: "booking",
                name: booking_id.to_string(),
            })?;
        if target.appointment_type != AppointmentKind::Unavailable {
            return Err(EngineError::Validation(format!(
                "booking {booking_id} is not an unavailability block"
            )));
        }
        self.store
            .set_status(resource, booking_id, BookingStatus::Cancelled)
    }
}
