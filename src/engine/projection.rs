// src/engine/projection.rs
//
// Walks forward from a start date, counting dates that fall on the allowed
// weekdays and are not branch holidays, until the requested session count is
// reached. Deterministic for fixed inputs; the only wall-clock-free input is
// the caller-supplied start date.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::store::ScheduleStore;

use super::holidays::HolidaySet;
use super::EngineError;

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionInput {
    pub start_date: NaiveDate,
    pub days_of_week: Vec<i32>, // 0=Sunday .. 6=Saturday
    pub total_sessions: i32,
    pub branch_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionResult {
    pub end_date: NaiveDate,
    /// Eligible weekdays skipped because they were holidays.
    pub holidays_skipped: i32,
    /// False when the holiday lookup failed and the walk degraded to a
    /// holiday-naive projection; the end date may then land on or before an
    /// actual holiday and need manual correction.
    pub holiday_aware: bool,
}

pub async fn project_end_date<S: ScheduleStore>(
    store: &S,
    input: &ProjectionInput,
) -> Result<ProjectionResult, EngineError> {
    if input.days_of_week.is_empty() {
        return Err(EngineError::NoDaysOfWeek);
    }
    if let Some(&bad) = input.days_of_week.iter().find(|d| !(0..=6).contains(*d)) {
        return Err(EngineError::InvalidWeekday(bad));
    }
    if input.total_sessions < 1 {
        return Err(EngineError::NoSessions);
    }

    let days: HashSet<i32> = input.days_of_week.iter().copied().collect();

    // Enough calendar for the sparsest pattern (one day a week) plus a year
    // of holiday slack; beyond that the input is treated as pathological.
    let horizon_days = input.total_sessions as i64 * 7 + 366;
    let horizon_end = input.start_date + Duration::days(horizon_days);

    let (holidays, holiday_aware) = match store
        .holidays_in_range(Some(input.branch_id), input.start_date, horizon_end)
        .await
    {
        Ok(rows) => (HolidaySet::for_branch(&rows, input.branch_id), true),
        Err(err) => {
            tracing::warn!(
                branch_id = input.branch_id,
                error = %err,
                "holiday lookup failed; projecting end date without holiday skips"
            );
            (HolidaySet::empty(), false)
        }
    };

    let mut counted = 0;
    let mut skipped = 0;
    let mut date = input.start_date;
    loop {
        let weekday = date.weekday().num_days_from_sunday() as i32;
        if days.contains(&weekday) {
            if holidays.contains(date) {
                skipped += 1;
            } else {
                counted += 1;
                if counted == input.total_sessions {
                    return Ok(ProjectionResult {
                        end_date: date,
                        holidays_skipped: skipped,
                        holiday_aware,
                    });
                }
            }
        }
        if date >= horizon_end {
            return Err(EngineError::ProjectionOverrun(horizon_days));
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => return Err(EngineError::ProjectionOverrun(horizon_days)),
        }
    }
}
