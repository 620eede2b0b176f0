//! Wall-clock time arithmetic and interval overlap tests.
//!
//! Everything here compares times within a single day. Date and time are
//! combined only where a real chronological instant is needed (the past-slot
//! guard in the conflict evaluator).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{EngineError, Result};

const SECONDS_PER_DAY: i64 = 86_400;

/// Parse a wall-clock time in `HH:MM:SS` or `HH:MM` form.
///
/// # Errors
/// `InvalidTime` if the string matches neither format.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| EngineError::InvalidTime(s.to_string()))
}

/// Signed minutes from `a` to `b`. Negative when `b` is earlier.
pub fn minutes_between(a: NaiveTime, b: NaiveTime) -> i64 {
    (b - a).num_minutes()
}

/// Half-open interval overlap: `[a_start, a_end)` vs `[b_start, b_end)`.
/// Touching endpoints do not overlap.
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Add minutes to a wall-clock time with no day rollover.
///
/// # Errors
/// `InvalidTime` if the result would cross midnight in either direction.
/// Bookings that span days are a caller error, not a wrap.
pub fn add_minutes(t: NaiveTime, minutes: i64) -> Result<NaiveTime> {
    let seconds = i64::from(t.num_seconds_from_midnight())
        .checked_add(minutes.checked_mul(60).ok_or_else(|| {
            EngineError::InvalidTime(format!("minute offset {minutes} overflows"))
        })?)
        .ok_or_else(|| EngineError::InvalidTime(format!("minute offset {minutes} overflows")))?;
    if !(0..SECONDS_PER_DAY).contains(&seconds) {
        return Err(EngineError::InvalidTime(format!(
            "{t} {minutes:+} minutes leaves the day"
        )));
    }
    NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0)
        .ok_or_else(|| EngineError::InvalidTime(format!("{t} {minutes:+} minutes")))
}

/// Whether a slot starting at `start` on `date` already lies in the past
/// relative to `now`.
///
/// Only the target date being *today* counts; rejecting queries for dates
/// entirely in the past is the caller's concern.
pub fn slot_is_past(date: NaiveDate, start: NaiveTime, now: NaiveDateTime) -> bool {
    date == now.date() && start < now.time()
}
