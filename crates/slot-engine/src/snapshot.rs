//! In-memory snapshot of schedules and bookings, loadable from JSON.
//!
//! Implements both boundary traits so a single document can back the whole
//! engine — used by the CLI and by tests. A production deployment would
//! implement [`ScheduleSource`] and [`BookingStore`] over its own storage.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::engine::{BookingStore, ScheduleSource};
use crate::error::{EngineError, Result};
use crate::types::{weekday_label, Booking, BookingStatus, ScheduleSlot};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub resources: BTreeMap<String, ResourceEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Schedule slots keyed by weekday label ("Monday".."Sunday"), kept in
    /// definition order within each day.
    #[serde(default)]
    pub schedule: BTreeMap<String, Vec<ScheduleSlot>>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn entry(&self, resource: &str) -> Result<&ResourceEntry> {
        self.resources
            .get(resource)
            .ok_or_else(|| EngineError::NotFound {
                kind: "resource",
                name: resource.to_string(),
            })
    }

    fn entry_mut(&mut self, resource: &str) -> Result<&mut ResourceEntry> {
        self.resources
            .get_mut(resource)
            .ok_or_else(|| EngineError::NotFound {
                kind: "resource",
                name: resource.to_string(),
            })
    }
}

impl ScheduleSource for Snapshot {
    fn schedule_for(&self, resource: &str, weekday: Weekday) -> Result<Vec<ScheduleSlot>> {
        let entry = self.entry(resource)?;
        Ok(entry
            .schedule
            .get(weekday_label(weekday))
            .cloned()
            .unwrap_or_default())
    }
}

impl BookingStore for Snapshot {
    fn bookings_for(&self, resource: &str, date: NaiveDate) -> Result<Vec<Booking>> {
        let entry = self.entry(resource)?;
        Ok(entry
            .bookings
            .iter()
            .filter(|b| b.appointment_date == date)
            .cloned()
            .collect())
    }

    fn insert(&mut self, resource: &str, booking: Booking) -> Result<()> {
        self.entry_mut(resource)?.bookings.push(booking);
        Ok(())
    }

    fn set_status(
        &mut self,
        resource: &str,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<()> {
        let entry = self.entry_mut(resource)?;
        let booking = entry
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| EngineError::NotFound {
                kind: "booking",
                name: booking_id.to_string(),
            })?;
        booking.status = status;
        Ok(())
    }
}
