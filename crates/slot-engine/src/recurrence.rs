//! Recurrence expansion — turns a repeat rule into concrete occurrence dates.
//!
//! Expansion is a read-only preview: each emitted date is probed for
//! conflicts against the booking snapshot, but nothing is committed. The
//! result is deterministic for a given rule and snapshot; there is no
//! protection against bookings made after the snapshot was taken.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};

use crate::error::{EngineError, Result};
use crate::types::{weekday_label, EndCondition, Frequency, Occurrence, RecurrenceRule};

/// Hard ceiling on expansion size. A rule that would emit more than this
/// many occurrences is rejected as a validation error instead of scanning
/// an unbounded date range.
pub const OCCURRENCE_CEILING: usize = 500;

/// Availability probe: `true` means the window on that date conflicts with
/// an existing booking.
pub trait AvailabilityProbe {
    fn has_conflict(
        &mut self,
        date: NaiveDate,
        from_time: chrono::NaiveTime,
        to_time: chrono::NaiveTime,
    ) -> Result<bool>;
}

impl<F> AvailabilityProbe for F
where
    F: FnMut(NaiveDate, chrono::NaiveTime, chrono::NaiveTime) -> Result<bool>,
{
    fn has_conflict(
        &mut self,
        date: NaiveDate,
        from_time: chrono::NaiveTime,
        to_time: chrono::NaiveTime,
    ) -> Result<bool> {
        self(date, from_time, to_time)
    }
}

/// Expand a recurrence rule into chronologically ascending occurrences.
///
/// Stepping:
/// - `Daily` — every day; the interval is forced to 1.
/// - `Weekly` — advances day by day and emits every date whose weekday is in
///   the rule's set, so multiple weekdays per week all appear. With
///   `interval > 1`, only every `interval`-th week (counted in 7-day blocks
///   from `start_date`) is eligible.
/// - `Monthly`/`Yearly` — adds `interval` months/years to the same
///   day-of-month, clamping to the end of shorter months.
///
/// Emission stops at the end condition: `Until` is inclusive of its date,
/// `MaxOccurrences` caps the count.
///
/// # Errors
/// `Validation` before any expansion when: the interval is zero, the time
/// range is inverted, a weekly rule has no weekdays, the start lies in the
/// past relative to `now`, or the rule would exceed [`OCCURRENCE_CEILING`].
pub fn expand<P>(rule: &RecurrenceRule, now: NaiveDateTime, mut probe: P) -> Result<Vec<Occurrence>>
where
    P: AvailabilityProbe,
{
    validate(rule, now)?;

    if rule.end == EndCondition::MaxOccurrences(0) {
        return Ok(Vec::new());
    }

    let step = match rule.frequency {
        Frequency::Daily => Step::Days(1),
        Frequency::Weekly => Step::DayScan {
            week_interval: rule.interval,
        },
        Frequency::Monthly => Step::Months(rule.interval),
        Frequency::Yearly => Step::Months(rule.interval.saturating_mul(12)),
    };

    let mut occurrences = Vec::new();
    let mut date = rule.start_date;
    let mut day_offset: i64 = 0;

    loop {
        match rule.end {
            EndCondition::Until(till) if date > till => break,
            EndCondition::MaxOccurrences(max) if occurrences.len() >= max as usize => break,
            _ => {}
        }

        let emit = match step {
            Step::DayScan { week_interval } => {
                let week = (day_offset / 7) as u32;
                week % week_interval == 0 && rule.weekdays.contains(date.weekday())
            }
            _ => true,
        };
        if emit {
            if occurrences.len() >= OCCURRENCE_CEILING {
                return Err(EngineError::Validation(format!(
                    "rule expands past {OCCURRENCE_CEILING} occurrences; tighten repeat till or max occurrences"
                )));
            }
            let conflict = probe.has_conflict(date, rule.from_time, rule.to_time)?;
            occurrences.push(Occurrence {
                date,
                from_time: rule.from_time,
                to_time: rule.to_time,
                weekday: weekday_label(date.weekday()).to_string(),
                conflict,
            });
        }

        date = advance(date, step)?;
        day_offset += 1;
    }

    Ok(occurrences)
}

#[derive(Clone, Copy)]
enum Step {
    Days(u64),
    Months(u32),
    /// Weekly mode: scan one day at a time, gated by the weekday set and the
    /// week interval.
    DayScan { week_interval: u32 },
}

fn advance(date: NaiveDate, step: Step) -> Result<NaiveDate> {
    let next = match step {
        Step::Days(n) => date.checked_add_days(Days::new(n)),
        Step::DayScan { .. } => date.checked_add_days(Days::new(1)),
        Step::Months(n) => date.checked_add_months(Months::new(n)),
    };
    next.ok_or_else(|| EngineError::Validation(format!("date overflow stepping from {date}")))
}

fn validate(rule: &RecurrenceRule, now: NaiveDateTime) -> Result<()> {
    if rule.interval == 0 {
        return Err(EngineError::Validation(
            "repeat interval must be at least 1".into(),
        ));
    }
    if rule.from_time >= rule.to_time {
        return Err(EngineError::Validation(format!(
            "recurrence time range {}–{} is inverted or empty",
            rule.from_time, rule.to_time
        )));
    }
    if rule.frequency == Frequency::Weekly && rule.weekdays.is_empty() {
        return Err(EngineError::Validation(
            "weekly repeat requires at least one weekday".into(),
        ));
    }
    if NaiveDateTime::new(rule.start_date, rule.from_time) < now {
        return Err(EngineError::Validation(format!(
            "start {} {} is in the past",
            rule.start_date, rule.from_time
        )));
    }
    if let EndCondition::MaxOccurrences(max) = rule.end {
        if max as usize > OCCURRENCE_CEILING {
            return Err(EngineError::Validation(format!(
                "max occurrences {max} exceeds the ceiling of {OCCURRENCE_CEILING}"
            )));
        }
    }
    Ok(())
}
