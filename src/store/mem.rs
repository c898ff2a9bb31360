// src/store/mem.rs
//
// In-memory ScheduleStore used by engine unit tests. Mirrors the filtering
// the SQL queries perform (status, date range, branch scope) so tests see the
// same row sets a live database would produce. Failure toggles simulate a
// broken dependency query.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::models::{ClassRecord, Holiday, MakeupClass, Room, SessionException, Teacher, TrialSession};
use crate::store::ScheduleStore;

#[derive(Default)]
pub struct MemStore {
    pub holidays: Vec<Holiday>,
    pub classes: Vec<ClassRecord>,
    pub exceptions: Vec<SessionException>,
    pub makeups: Vec<MakeupClass>,
    pub trials: Vec<TrialSession>,
    pub rooms: Vec<Room>,
    pub teachers: Vec<Teacher>,
    pub fail_holidays: bool,
    pub fail_makeups: bool,
}

#[async_trait]
impl ScheduleStore for MemStore {
    async fn holidays_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Holiday>> {
        if self.fail_holidays {
            bail!("holiday query failed");
        }
        Ok(self
            .holidays
            .iter()
            .filter(|h| h.date >= start && h.date <= end)
            .filter(|h| branch_id.map_or(true, |b| h.applies_to(b)))
            .cloned()
            .collect())
    }

    async fn active_classes(&self, branch_id: Option<i64>) -> Result<Vec<ClassRecord>> {
        Ok(self
            .classes
            .iter()
            .filter(|c| c.status == "active")
            .filter(|c| branch_id.map_or(true, |b| c.branch_id == b))
            .cloned()
            .collect())
    }

    async fn session_exceptions_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SessionException>> {
        let branch_of = |class_id: i64| {
            self.classes
                .iter()
                .find(|c| c.class_id == class_id)
                .map(|c| c.branch_id)
        };
        Ok(self
            .exceptions
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .filter(|e| branch_id.map_or(true, |b| branch_of(e.class_id) == Some(b)))
            .cloned()
            .collect())
    }

    async fn scheduled_makeups_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MakeupClass>> {
        if self.fail_makeups {
            bail!("makeup query failed");
        }
        Ok(self
            .makeups
            .iter()
            .filter(|m| m.status == "scheduled")
            .filter(|m| m.makeup_date >= start && m.makeup_date <= end)
            .filter(|m| branch_id.map_or(true, |b| m.branch_id == b))
            .cloned()
            .collect())
    }

    async fn scheduled_trials_in_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TrialSession>> {
        Ok(self
            .trials
            .iter()
            .filter(|t| t.status == "scheduled")
            .filter(|t| t.scheduled_date >= start && t.scheduled_date <= end)
            .filter(|t| branch_id.map_or(true, |b| t.branch_id == b))
            .cloned()
            .collect())
    }

    async fn active_rooms(&self, branch_id: i64) -> Result<Vec<Room>> {
        Ok(self
            .rooms
            .iter()
            .filter(|r| r.branch_id == branch_id && r.is_active)
            .cloned()
            .collect())
    }

    async fn active_teachers(&self, branch_id: i64) -> Result<Vec<Teacher>> {
        Ok(self
            .teachers
            .iter()
            .filter(|t| t.branch_id == branch_id && t.is_active)
            .cloned()
            .collect())
    }
}

// ───────────────────────────────────────
// Row builders shared by engine tests
// ───────────────────────────────────────

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn national_holiday(id: i64, date: NaiveDate, name: &str) -> Holiday {
    Holiday {
        holiday_id: id,
        date,
        name: name.into(),
        holiday_type: "national".into(),
        branch_ids: vec![],
    }
}

pub fn branch_holiday(id: i64, date: NaiveDate, name: &str, branches: Vec<i64>) -> Holiday {
    Holiday {
        holiday_id: id,
        date,
        name: name.into(),
        holiday_type: "branch".into(),
        branch_ids: branches,
    }
}

pub fn room(id: i64, branch_id: i64, name: &str) -> Room {
    Room { room_id: id, branch_id, name: name.into(), capacity: None, is_active: true }
}

pub fn teacher(id: i64, branch_id: i64, name: &str) -> Teacher {
    Teacher { teacher_id: id, branch_id, name: name.into(), is_active: true }
}

#[allow(clippy::too_many_arguments)]
pub fn class(
    id: i64,
    branch_id: i64,
    name: &str,
    room_id: i64,
    teacher_id: i64,
    days_of_week: Vec<i32>,
    start_time: NaiveTime,
    end_time: NaiveTime,
    start_date: NaiveDate,
    total_sessions: i32,
) -> ClassRecord {
    ClassRecord {
        class_id: id,
        branch_id,
        name: name.into(),
        subject: None,
        subject_color: None,
        room_id,
        teacher_id,
        days_of_week,
        start_time,
        end_time,
        start_date,
        total_sessions,
        status: "active".into(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn makeup(
    id: i64,
    branch_id: i64,
    student: &str,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    room_id: Option<i64>,
    teacher_id: Option<i64>,
) -> MakeupClass {
    MakeupClass {
        makeup_id: id,
        class_id: None,
        branch_id,
        student_name: student.into(),
        makeup_date: date,
        start_time,
        end_time,
        room_id,
        teacher_id,
        status: "scheduled".into(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn trial(
    id: i64,
    branch_id: i64,
    student: &str,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    room_id: Option<i64>,
    teacher_id: Option<i64>,
) -> TrialSession {
    TrialSession {
        trial_id: id,
        branch_id,
        student_name: student.into(),
        subject: None,
        scheduled_date: date,
        start_time,
        end_time,
        room_id,
        teacher_id,
        status: "scheduled".into(),
    }
}
