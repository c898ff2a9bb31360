// src/engine/mod.rs
//
// Conflict-and-availability resolution engine. Pure scheduling logic over the
// ScheduleStore seam: nothing in here touches the database directly or keeps
// state between calls.

use thiserror::Error;

pub mod availability;
pub mod clock;
pub mod commitments;
pub mod holidays;
pub mod projection;
pub mod report;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid time '{0}': expected HH:MM")]
    InvalidTime(String),
    #[error("start time {0} must be before end time {1}")]
    EmptyWindow(String, String),
    #[error("days_of_week must not be empty")]
    NoDaysOfWeek,
    #[error("invalid weekday {0}: expected 0 (Sunday) through 6 (Saturday)")]
    InvalidWeekday(i32),
    #[error("total_sessions must be at least 1")]
    NoSessions,
    #[error("slot_minutes must be at least 1")]
    BadSlotWidth,
    #[error("projection did not reach the session count within {0} days")]
    ProjectionOverrun(i64),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl EngineError {
    /// Caller mistake (reject with 400) as opposed to an infrastructure
    /// failure or an input so degenerate the walk cap tripped.
    pub fn is_validation(&self) -> bool {
        !matches!(self, EngineError::Store(_) | EngineError::ProjectionOverrun(_))
    }
}
