// src/models/mod.rs

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ───────────────────────────────────────
// Reference data: branches, rooms, teachers
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub branch_id: i64,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub room_id: i64,
    pub branch_id: i64,
    pub name: String,
    pub capacity: Option<i32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Teacher {
    pub teacher_id: i64,
    pub branch_id: i64, // home branch; commitments may span branches
    pub name: String,
    pub is_active: bool,
}

// ───────────────────────────────────────
// Scheduling records
// ───────────────────────────────────────

/// A class with a recurring weekly pattern. Concrete session dates are
/// expanded on demand by the engine, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClassRecord {
    pub class_id: i64,
    pub branch_id: i64,
    pub name: String,
    pub subject: Option<String>,
    pub subject_color: Option<String>,
    pub room_id: i64,
    pub teacher_id: i64,
    pub days_of_week: Vec<i32>, // 0=Sunday .. 6=Saturday
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub start_date: NaiveDate,
    pub total_sessions: i32,
    pub status: String, // active|completed|cancelled
}

/// A session occurrence cancelled or rescheduled away from its regular slot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionException {
    pub exception_id: i64,
    pub class_id: i64,
    pub date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MakeupClass {
    pub makeup_id: i64,
    pub class_id: Option<i64>,
    pub branch_id: i64,
    pub student_name: String,
    pub makeup_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub status: String, // scheduled|completed|cancelled
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrialSession {
    pub trial_id: i64,
    pub branch_id: i64,
    pub student_name: String,
    pub subject: Option<String>,
    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub status: String, // scheduled|completed|cancelled|no_show
}

/// A non-teaching date. `holiday_type = "national"` applies everywhere;
/// `"branch"` applies only to the branches listed in `branch_ids`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Holiday {
    pub holiday_id: i64,
    pub date: NaiveDate,
    pub name: String,
    pub holiday_type: String, // national|branch
    pub branch_ids: Vec<i64>,
}

impl Holiday {
    pub fn applies_to(&self, branch_id: i64) -> bool {
        self.holiday_type == "national" || self.branch_ids.contains(&branch_id)
    }
}
