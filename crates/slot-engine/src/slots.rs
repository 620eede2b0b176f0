//! Slot generation — instantiates schedule templates for a concrete date.

use chrono::NaiveDate;

use crate::error::{EngineError, Result};
use crate::types::{CandidateSlot, ScheduleSlot};

/// Expand a resource's daily schedule into candidate slots for `date`.
///
/// One candidate per schedule entry, **in definition order** — callers see
/// slots the way the schedule lists them, not sorted by time. Entries with
/// `maximum_appointments` become whole-day quota candidates; the evaluator
/// treats those as a per-day counter rather than a time window.
///
/// # Errors
/// `Validation` if any schedule slot has an inverted or empty time range.
/// A malformed schedule fails the whole query rather than dropping the bad
/// entry.
pub fn generate_candidates(
    schedule: &[ScheduleSlot],
    date: NaiveDate,
) -> Result<Vec<CandidateSlot>> {
    schedule
        .iter()
        .map(|slot| {
            if slot.from_time >= slot.to_time {
                return Err(EngineError::Validation(format!(
                    "schedule slot {}–{} ({}) has an inverted time range",
                    slot.from_time, slot.to_time, slot.service_unit
                )));
            }
            Ok(CandidateSlot {
                date,
                service_unit: slot.service_unit.clone(),
                from_time: slot.from_time,
                to_time: slot.to_time,
                allow_overlap: slot.allow_overlap,
                capacity: slot.service_unit_capacity,
                max_per_day: slot.maximum_appointments,
                tele_conference: slot.tele_conference_enabled,
                disabled: false,
                available_count: None,
                tooltip: None,
            })
        })
        .collect()
}
