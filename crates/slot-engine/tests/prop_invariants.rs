//! Property-based tests for the conflict evaluator and recurrence expander.
//!
//! These verify laws that should hold for *any* snapshot, not just the
//! examples in the unit tests.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;
use slot_engine::conflict::{evaluate_slot, ConflictPolicy};
use slot_engine::recurrence::expand;
use slot_engine::types::WeekdaySet;
use slot_engine::{
    AppointmentKind, Booking, BookingStatus, CandidateSlot, EndCondition, Frequency,
    RecurrenceRule,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

const DATE: &str = "2024-06-03";

fn minutes(m: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(m * 60, 0).unwrap()
}

fn test_date() -> NaiveDate {
    DATE.parse().unwrap()
}

/// Midnight on the slot date, so the past-slot guard never fires.
fn early_now() -> NaiveDateTime {
    NaiveDateTime::new(test_date(), minutes(0))
}

/// A windowed slot somewhere in the working day.
fn arb_slot(allow_overlap: bool, capacity: Option<u32>) -> impl Strategy<Value = CandidateSlot> {
    (480u32..960, 1u32..=24).prop_map(move |(start, steps)| CandidateSlot {
        date: test_date(),
        service_unit: "physio-1".into(),
        from_time: minutes(start),
        to_time: minutes(start + steps * 5),
        allow_overlap,
        capacity,
        max_per_day: None,
        tele_conference: false,
        disabled: false,
        available_count: None,
        tooltip: None,
    })
}

fn arb_status() -> impl Strategy<Value = BookingStatus> {
    prop_oneof![
        3 => Just(BookingStatus::Open),
        1 => Just(BookingStatus::Confirmed),
        2 => Just(BookingStatus::Cancelled),
    ]
}

fn arb_bookings() -> impl Strategy<Value = Vec<Booking>> {
    prop::collection::vec((480u32..1080, 1i64..=18, arb_status()), 0..8).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (start, steps, status))| Booking {
                id: format!("APT-{index}"),
                patient: "PAT-001".into(),
                appointment_date: test_date(),
                appointment_time: minutes(start),
                duration_minutes: steps * 5,
                end_time: None,
                status,
                appointment_type: AppointmentKind::Normal,
                reason: None,
            })
            .collect()
    })
}

fn arb_weekdays() -> impl Strategy<Value = WeekdaySet> {
    (1u8..128).prop_map(|bits| {
        let mut set = WeekdaySet::EMPTY;
        for day in [
            chrono::Weekday::Mon,
            chrono::Weekday::Tue,
            chrono::Weekday::Wed,
            chrono::Weekday::Thu,
            chrono::Weekday::Fri,
            chrono::Weekday::Sat,
            chrono::Weekday::Sun,
        ] {
            if bits & (1 << day.num_days_from_monday()) != 0 {
                set.insert(day);
            }
        }
        set
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn overlapping_count(slot: &CandidateSlot, bookings: &[Booking]) -> usize {
    bookings
        .iter()
        .filter(|b| !b.is_cancelled())
        .filter(|b| {
            let end = b.effective_end().unwrap();
            slot.from_time < end && b.appointment_time < slot.to_time
        })
        .count()
}

// ---------------------------------------------------------------------------
// Property 1: the evaluator is a pure function of its inputs
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn evaluator_is_pure(slot in arb_slot(true, Some(3)), bookings in arb_bookings()) {
        let first = evaluate_slot(slot.clone(), &bookings, early_now(), ConflictPolicy::default());
        let second = evaluate_slot(slot, &bookings, early_now(), ConflictPolicy::default());
        prop_assert_eq!(first.unwrap(), second.unwrap());
    }
}

// ---------------------------------------------------------------------------
// Property 2: no-overlap slots disable iff any non-cancelled booking overlaps
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn no_overlap_slot_disables_iff_overlap_exists(
        slot in arb_slot(false, None),
        bookings in arb_bookings(),
    ) {
        let expected = overlapping_count(&slot, &bookings) > 0;
        let result = evaluate_slot(slot, &bookings, early_now(), ConflictPolicy::default()).unwrap();
        prop_assert_eq!(result.disabled, expected);
    }
}

// ---------------------------------------------------------------------------
// Property 3: capacity law for overlap-allowed slots
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn capacity_law_holds(
        slot in arb_slot(true, None),
        bookings in arb_bookings(),
        capacity in 0u32..=5,
    ) {
        let slot = CandidateSlot { capacity: Some(capacity), ..slot };
        let true_count = overlapping_count(&slot, &bookings) as u32;

        let result = evaluate_slot(slot, &bookings, early_now(), ConflictPolicy::default()).unwrap();

        prop_assert_eq!(result.disabled, true_count >= capacity);
        prop_assert_eq!(result.available_count, Some(capacity.saturating_sub(true_count)));
    }
}

// ---------------------------------------------------------------------------
// Property 4: weekly expansion is sorted, bounded, and respects the mask
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn weekly_expansion_is_sorted_bounded_and_masked(
        weekdays in arb_weekdays(),
        interval in 1u32..=4,
        max in 1u32..=20,
        start_offset in 0u32..60,
    ) {
        let start = test_date() + chrono::Days::new(start_offset as u64);
        let rule = RecurrenceRule {
            frequency: Frequency::Weekly,
            interval,
            weekdays,
            start_date: start,
            from_time: minutes(540),
            to_time: minutes(570),
            end: EndCondition::MaxOccurrences(max),
        };

        let occurrences = expand(
            &rule,
            early_now(),
            |_: NaiveDate, _: NaiveTime, _: NaiveTime| Ok(false),
        ).unwrap();

        prop_assert_eq!(occurrences.len(), max as usize, "non-empty mask always fills the quota");
        for pair in occurrences.windows(2) {
            prop_assert!(pair[0].date < pair[1].date, "occurrences must ascend");
        }
        for occurrence in &occurrences {
            prop_assert!(occurrence.date >= start);
            prop_assert!(rule.weekdays.contains(occurrence.date.weekday()));
        }
    }
}
