//! Error types for engine operations.

use thiserror::Error;

use crate::types::Booking;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed wall-clock time, or time arithmetic that would leave the day.
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// Contradictory or incomplete input, rejected before any computation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested window collides with existing bookings. Carries the
    /// colliding records so the caller can show them and decide.
    #[error("{} conflicting booking(s): {}", .0.len(), booking_ids(.0))]
    Conflict(Vec<Booking>),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// A booking appeared between the conflict check and the commit.
    /// Retryable: re-run the operation against a fresh snapshot.
    #[error("Snapshot out of date: {0}")]
    StaleSnapshot(String),

    /// A snapshot document could not be parsed.
    #[error("Snapshot parse error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

fn booking_ids(bookings: &[Booking]) -> String {
    bookings
        .iter()
        .map(|b| b.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience alias used throughout slot-engine.
pub type Result<T> = std::result::Result<T, EngineError>;
