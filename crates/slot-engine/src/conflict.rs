//! Booking conflict evaluation.
//!
//! A pure function of (slot definition, date, booking snapshot) — no state
//! survives a query, and evaluating the same snapshot twice yields the same
//! verdict. Bookings are visited in input order and the first disabling
//! condition wins, which also decides which tooltip reason the caller sees.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::timeutil;
use crate::types::{AppointmentKind, Booking, BookingStatus, CandidateSlot};

pub const UNAVAILABLE_TOOLTIP: &str = "Practitioner unavailable at this time";

/// Policy knobs for which bookings participate in conflict checks.
///
/// Cancelled bookings are always excluded. The source system never settled
/// whether a booking stuck in Needs Rescheduling keeps its original slot
/// reserved while the new one is found, so that is a caller decision here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPolicy {
    /// Keep Needs Rescheduling bookings in conflict checks (their old slot
    /// stays reserved until the reschedule completes).
    pub hold_needs_rescheduling: bool,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self {
            hold_needs_rescheduling: true,
        }
    }
}

/// Bookings that count for conflict purposes under `policy`.
pub fn relevant_bookings(
    bookings: &[Booking],
    policy: ConflictPolicy,
) -> impl Iterator<Item = &Booking> {
    bookings.iter().filter(move |b| {
        if b.is_cancelled() {
            return false;
        }
        if b.status == BookingStatus::NeedsRescheduling && !policy.hold_needs_rescheduling {
            return false;
        }
        true
    })
}

/// Evaluate one candidate slot against a booking snapshot.
///
/// Windowed slots:
/// 1. A slot on today's date whose start already passed `now` is disabled
///    outright (no retroactive booking).
/// 2. An overlap-allowed slot with zero capacity can never hold a booking
///    and is disabled without scanning.
/// 3. Per booking on the slot's date, in input order: an overlapping
///    unavailability block disables with a tooltip; a zero-length booking
///    starting at or inside the slot disables; otherwise overlap either
///    disables immediately (`allow_overlap == false`) or counts against
///    `capacity`. Bookings on other dates are ignored.
///
/// Whole-day quota slots ignore time overlap entirely: every relevant
/// booking on the slot's date counts against `max_per_day`, and those slots
/// stay bookable even when their nominal window has passed.
///
/// # Errors
/// `Validation` on malformed booking data (negative duration, end past
/// midnight). A snapshot with one bad record fails the whole query.
pub fn evaluate_slot(
    mut slot: CandidateSlot,
    bookings: &[Booking],
    now: NaiveDateTime,
    policy: ConflictPolicy,
) -> Result<CandidateSlot> {
    if let Some(max) = slot.max_per_day {
        let mut day_count: u32 = 0;
        for booking in relevant_bookings(bookings, policy) {
            booking.effective_end()?;
            if booking.appointment_date == slot.date {
                day_count += 1;
            }
        }
        slot.disabled = day_count >= max;
        slot.available_count = Some(max.saturating_sub(day_count));
        return Ok(slot);
    }

    if timeutil::slot_is_past(slot.date, slot.from_time, now) {
        slot.disabled = true;
        return Ok(slot);
    }

    if slot.allow_overlap && slot.capacity == Some(0) {
        slot.disabled = true;
        slot.available_count = Some(0);
        return Ok(slot);
    }

    let mut overlap_count: u32 = 0;
    for booking in relevant_bookings(bookings, policy) {
        if booking.appointment_date != slot.date {
            continue;
        }
        let start = booking.appointment_time;
        let end = booking.effective_end()?;

        if booking.appointment_type == AppointmentKind::Unavailable {
            if timeutil::intervals_overlap(slot.from_time, slot.to_time, start, end) {
                slot.disabled = true;
                slot.tooltip = Some(UNAVAILABLE_TOOLTIP.to_string());
                break;
            }
            continue;
        }

        // Point block: zero-length booking at the slot start or inside the
        // window kills the slot regardless of overlap mode.
        if end == start {
            if start >= slot.from_time && start < slot.to_time {
                slot.disabled = true;
                break;
            }
            continue;
        }

        let overlaps = timeutil::intervals_overlap(slot.from_time, slot.to_time, start, end);
        if !slot.allow_overlap {
            if overlaps {
                slot.disabled = true;
                break;
            }
        } else if overlaps {
            overlap_count += 1;
            if let Some(capacity) = slot.capacity {
                if overlap_count >= capacity {
                    slot.disabled = true;
                    break;
                }
            }
        }
    }

    if slot.allow_overlap {
        if let Some(capacity) = slot.capacity {
            let available = capacity.saturating_sub(overlap_count);
            slot.available_count = Some(available);
            if slot.tooltip.is_none() && !slot.disabled {
                slot.tooltip = Some(format!("{available} slots available for booking"));
            }
        }
    }

    Ok(slot)
}

/// Bookings colliding with the window `[from_time, to_time)` on `date`.
///
/// Empty result means the window is free. Point blocks count when their
/// start lies inside the window; everything else uses half-open overlap.
///
/// # Errors
/// `Validation` if the window is inverted/empty or a booking record is
/// malformed.
pub fn check_conflicts(
    bookings: &[Booking],
    date: NaiveDate,
    from_time: NaiveTime,
    to_time: NaiveTime,
    policy: ConflictPolicy,
) -> Result<Vec<Booking>> {
    if from_time >= to_time {
        return Err(EngineError::Validation(format!(
            "conflict window {from_time}–{to_time} is inverted or empty"
        )));
    }

    let mut hits = Vec::new();
    for booking in relevant_bookings(bookings, policy) {
        if booking.appointment_date != date {
            continue;
        }
        let start = booking.appointment_time;
        let end = booking.effective_end()?;
        let collides = if end == start {
            start >= from_time && start < to_time
        } else {
            timeutil::intervals_overlap(from_time, to_time, start, end)
        };
        if collides {
            hits.push(booking.clone());
        }
    }
    Ok(hits)
}
