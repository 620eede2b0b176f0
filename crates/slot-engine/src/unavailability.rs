//! Unavailability blocks — synthetic zero-patient bookings that reserve time
//! against normal bookings.

use chrono::NaiveDate;

use crate::conflict::{self, ConflictPolicy};
use crate::error::{EngineError, Result};
use crate::types::{
    AppointmentKind, Booking, BookingStatus, TimeRange, UNAVAILABLE_PATIENT,
};

/// Build the synthetic booking representing an unavailability window.
///
/// The record carries the sentinel patient identity, an explicit end time,
/// and a derived duration; downstream it behaves like any other booking in
/// conflict math (the Unavailable kind triggers the evaluator's override
/// branch).
pub fn build_unavailability(
    resource: &str,
    date: NaiveDate,
    range: TimeRange,
    reason: Option<String>,
) -> Result<Booking> {
    Ok(Booking {
        id: format!("UNAVAIL-{resource}-{date}-{}", range.from_time.format("%H:%M")),
        patient: UNAVAILABLE_PATIENT.to_string(),
        appointment_date: date,
        appointment_time: range.from_time,
        duration_minutes: range.duration_minutes(),
        end_time: Some(range.to_time),
        status: BookingStatus::Unavailable,
        appointment_type: AppointmentKind::Unavailable,
        reason,
    })
}

/// Refuse unless the window is empty of real appointments.
///
/// # Errors
/// `Conflict` carrying every colliding booking — creation is only permitted
/// over a window with no non-cancelled bookings at all.
pub fn ensure_window_free(
    bookings: &[Booking],
    date: NaiveDate,
    range: TimeRange,
    policy: ConflictPolicy,
) -> Result<()> {
    let hits = conflict::check_conflicts(bookings, date, range.from_time, range.to_time, policy)?;
    if hits.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Conflict(hits))
    }
}
