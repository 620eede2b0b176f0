//! Domain model: schedule templates, bookings, candidate slots, recurrence rules.
//!
//! Everything here is plain data. The types carry no behavior beyond small
//! accessors and validated constructors; the algorithms live in [`crate::slots`],
//! [`crate::conflict`], and [`crate::recurrence`].

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::timeutil;

/// Sentinel patient identity carried by synthetic unavailability bookings.
pub const UNAVAILABLE_PATIENT: &str = "[Unavailable]";

/// Lifecycle status of a booking.
///
/// `Cancelled` bookings never participate in conflict checks. Whether
/// `NeedsRescheduling` bookings keep their original slot reserved is a
/// policy decision, see [`crate::conflict::ConflictPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Open,
    Scheduled,
    Confirmed,
    #[serde(rename = "Checked In")]
    CheckedIn,
    #[serde(rename = "Needs Rescheduling")]
    NeedsRescheduling,
    Cancelled,
    Unavailable,
    Closed,
    #[serde(rename = "No Show")]
    NoShow,
}

/// Kind of booking. `Unavailable` is the sentinel kind for time blocked off
/// by a practitioner; `BlockBooking` is an ad-hoc booking with an explicit
/// end time rather than a schedule-slot duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentKind {
    Normal,
    Unavailable,
    #[serde(rename = "Block Booking")]
    BlockBooking,
}

/// One bookable window template for a resource on a given weekday.
///
/// Immutable per schedule definition. A slot with `maximum_appointments` set
/// is a whole-day quota counter rather than a narrow time window; the two
/// modes are mutually exclusive and are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub service_unit: String,
    pub from_time: NaiveTime,
    pub to_time: NaiveTime,
    #[serde(default)]
    pub allow_overlap: bool,
    #[serde(default)]
    pub service_unit_capacity: Option<u32>,
    #[serde(default)]
    pub maximum_appointments: Option<u32>,
    #[serde(default)]
    pub tele_conference_enabled: bool,
}

/// An existing appointment occupying time on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub patient: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    /// Length in minutes. `0` with no explicit `end_time` is a point block
    /// that fully disables any slot whose start it touches.
    #[serde(default)]
    pub duration_minutes: i64,
    /// Explicit end, used by block bookings and unavailability windows.
    /// Takes precedence over `duration_minutes` when present.
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    pub status: BookingStatus,
    pub appointment_type: AppointmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Booking {
    /// Effective end of the booking: the explicit `end_time` if present,
    /// otherwise `appointment_time + duration_minutes`.
    ///
    /// # Errors
    /// A negative duration, or one that pushes the end past midnight, is
    /// malformed booking data and fails the whole evaluation — bad records
    /// are never skipped silently.
    pub fn effective_end(&self) -> Result<NaiveTime> {
        if let Some(end) = self.end_time {
            return Ok(end);
        }
        if self.duration_minutes < 0 {
            return Err(EngineError::Validation(format!(
                "booking {} has negative duration {}",
                self.id, self.duration_minutes
            )));
        }
        timeutil::add_minutes(self.appointment_time, self.duration_minutes)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

/// A [`ScheduleSlot`] instantiated for one concrete date, with the
/// availability verdict filled in by the conflict evaluator.
///
/// Generated fresh per availability query; never persisted. Returned by
/// value from slot selection so no mutable dialog state leaks between
/// queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub date: NaiveDate,
    pub service_unit: String,
    pub from_time: NaiveTime,
    pub to_time: NaiveTime,
    pub allow_overlap: bool,
    /// Simultaneous-booking capacity for overlap-allowed slots.
    pub capacity: Option<u32>,
    /// Daily quota for whole-day counter slots.
    pub max_per_day: Option<u32>,
    /// Presentation metadata only; does not affect availability math.
    pub tele_conference: bool,
    pub disabled: bool,
    pub available_count: Option<u32>,
    pub tooltip: Option<String>,
}

impl CandidateSlot {
    /// Whole-day counter slots track a daily quota instead of a time window.
    pub fn is_whole_day(&self) -> bool {
        self.max_per_day.is_some()
    }
}

/// A wall-clock window within a single day. `new` enforces `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from_time: NaiveTime,
    pub to_time: NaiveTime,
}

impl TimeRange {
    pub fn new(from_time: NaiveTime, to_time: NaiveTime) -> Result<Self> {
        if from_time >= to_time {
            return Err(EngineError::Validation(format!(
                "time range {from_time}–{to_time} is inverted or empty"
            )));
        }
        Ok(Self { from_time, to_time })
    }

    pub fn duration_minutes(&self) -> i64 {
        timeutil::minutes_between(self.from_time, self.to_time)
    }
}

/// What a caller is about to submit: either a generated candidate slot or an
/// ad-hoc block of time. Modeled as a tagged union so mode switches are
/// explicit rather than implied by which dialog fields happen to be visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingMode {
    Slot(CandidateSlot),
    Block(TimeRange),
}

impl BookingMode {
    /// Check that this selection can actually be submitted.
    pub fn ensure_bookable(&self) -> Result<()> {
        match self {
            BookingMode::Slot(slot) if slot.disabled => Err(EngineError::Validation(format!(
                "slot {}–{} on {} is not bookable",
                slot.from_time, slot.to_time, slot.date
            ))),
            BookingMode::Slot(_) => Ok(()),
            BookingMode::Block(range) => {
                TimeRange::new(range.from_time, range.to_time).map(|_| ())
            }
        }
    }
}

/// Repeat frequency for recurring bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// End condition for a recurrence rule. Exactly one applies; the enum makes
/// the choice structural. Use [`EndCondition::from_options`] when both come
/// in as optional fields from a form or CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCondition {
    /// Emit dates up to and including this one.
    Until(NaiveDate),
    /// Emit at most this many dates.
    MaxOccurrences(u32),
}

impl EndCondition {
    /// Resolve the two optional form fields into the one required condition.
    ///
    /// # Errors
    /// `Validation` unless exactly one of the two is set.
    pub fn from_options(
        repeat_till: Option<NaiveDate>,
        max_occurrences: Option<u32>,
    ) -> Result<Self> {
        match (repeat_till, max_occurrences) {
            (Some(date), None) => Ok(EndCondition::Until(date)),
            (None, Some(count)) => Ok(EndCondition::MaxOccurrences(count)),
            (None, None) => Err(EngineError::Validation(
                "either repeat till or max occurrences must be set".into(),
            )),
            (Some(_), Some(_)) => Err(EngineError::Validation(
                "repeat till and max occurrences are mutually exclusive".into(),
            )),
        }
    }
}

/// Set of weekdays a weekly rule repeats on.
///
/// Serialized as a list of weekday names ("Monday", "Wednesday", ...), the
/// same labels schedule definitions use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    pub fn from_days(days: &[Weekday]) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in days {
            set.insert(*day);
        }
        set
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_WEEKDAYS.iter().copied().filter(|d| self.contains(*d))
    }
}

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// English label for a weekday, matching schedule definition rows.
pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let labels: Vec<&str> = self.iter().map(weekday_label).collect();
        labels.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let labels = Vec::<String>::deserialize(deserializer)?;
        let mut set = WeekdaySet::EMPTY;
        for label in labels {
            let day: Weekday = label
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("unknown weekday: {label}")))?;
            set.insert(day);
        }
        Ok(set)
    }
}

/// A repeat rule describing a sequence of booking attempts.
///
/// Invariants, enforced by [`crate::recurrence::expand`] before any
/// expansion happens:
/// - `from_time < to_time` strictly;
/// - `interval >= 1` (and forced to 1 for `Daily`);
/// - `weekdays` non-empty when `frequency` is `Weekly`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    #[serde(default)]
    pub weekdays: WeekdaySet,
    pub start_date: NaiveDate,
    pub from_time: NaiveTime,
    pub to_time: NaiveTime,
    pub end: EndCondition,
}

/// One expansion result of a [`RecurrenceRule`]: a concrete date plus the
/// conflict verdict from the availability probe at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub from_time: NaiveTime,
    pub to_time: NaiveTime,
    pub weekday: String,
    pub conflict: bool,
}
