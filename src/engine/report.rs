// src/engine/report.rs
//
// Day-grid availability report: fixed-width time slots for every active room
// and teacher of a branch. Slots are judged with the same overlap primitive
// and the same commitment enumeration as the single-booking check, so the
// grid and the interactive check never disagree.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Serialize;

use crate::store::ScheduleStore;

use super::clock::{hhmm, TimeWindow};
use super::commitments::{find_commitments, Commitment, CommitmentQuery};
use super::EngineError;

#[derive(Debug, Clone, Serialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub available: bool,
    pub conflicts: Vec<Commitment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomAvailability {
    pub room_id: i64,
    pub name: String,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherAvailability {
    pub teacher_id: i64,
    pub name: String,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub branch_id: i64,
    pub date: NaiveDate,
    /// Set when the date is a non-teaching day for the branch; every slot is
    /// then unavailable regardless of commitments.
    pub holiday: Option<String>,
    pub rooms: Vec<RoomAvailability>,
    pub teachers: Vec<TeacherAvailability>,
}

pub async fn build_day_report<S: ScheduleStore>(
    store: &S,
    branch_id: i64,
    date: NaiveDate,
    range: TimeWindow,
    slot_minutes: u32,
    as_of: Option<NaiveDate>,
) -> Result<DayReport, EngineError> {
    if slot_minutes == 0 {
        return Err(EngineError::BadSlotWidth);
    }

    // Cross-branch enumeration: branch rooms only ever match branch
    // commitments, while teachers must show commitments from any branch.
    let q = CommitmentQuery {
        branch_id: None,
        room_id: None,
        teacher_id: None,
        start: date,
        end: date,
        exclude: None,
        as_of,
    };
    let (rooms, teachers, holidays, commitments) = tokio::try_join!(
        async { store.active_rooms(branch_id).await.map_err(EngineError::from) },
        async { store.active_teachers(branch_id).await.map_err(EngineError::from) },
        async {
            store
                .holidays_in_range(Some(branch_id), date, date)
                .await
                .map_err(EngineError::from)
        },
        find_commitments(store, &q),
    )?;

    let holiday = holidays
        .iter()
        .find(|h| h.applies_to(branch_id))
        .map(|h| h.name.clone());
    let windows = slot_windows(range, slot_minutes);

    let rooms = rooms
        .into_iter()
        .map(|r| RoomAvailability {
            slots: build_slots(&windows, &commitments, holiday.is_some(), |c| {
                c.room_id == Some(r.room_id)
            }),
            room_id: r.room_id,
            name: r.name,
        })
        .collect();

    let teachers = teachers
        .into_iter()
        .map(|t| TeacherAvailability {
            slots: build_slots(&windows, &commitments, holiday.is_some(), |c| {
                c.teacher_id == Some(t.teacher_id)
            }),
            teacher_id: t.teacher_id,
            name: t.name,
        })
        .collect();

    Ok(DayReport { branch_id, date, holiday, rooms, teachers })
}

fn build_slots(
    windows: &[TimeWindow],
    commitments: &[Commitment],
    is_holiday: bool,
    matches: impl Fn(&Commitment) -> bool,
) -> Vec<TimeSlot> {
    windows
        .iter()
        .map(|w| {
            let conflicts: Vec<Commitment> = commitments
                .iter()
                .filter(|&c| matches(c) && c.window().overlaps(w))
                .cloned()
                .collect();
            TimeSlot {
                start_time: w.start,
                end_time: w.end,
                available: !is_holiday && conflicts.is_empty(),
                conflicts,
            }
        })
        .collect()
}

/// Fixed-width slots spanning the range; the final slot is clipped to the
/// range end.
fn slot_windows(range: TimeWindow, slot_minutes: u32) -> Vec<TimeWindow> {
    let start_min = range.start.num_seconds_from_midnight() / 60;
    let end_min = range.end.num_seconds_from_midnight() / 60;
    let mut out = Vec::new();
    let mut m = start_min;
    while m < end_min {
        let e = (m + slot_minutes).min(end_min);
        if let (Some(start), Some(end)) = (from_minutes(m), from_minutes(e)) {
            out.push(TimeWindow { start, end });
        }
        m = e;
    }
    out
}

fn from_minutes(m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(m / 60, m % 60, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::availability::{check_availability, AvailabilityRequest};
    use crate::store::mem::{d, makeup, national_holiday, room, t, teacher, trial, MemStore};

    fn range(s: (u32, u32), e: (u32, u32)) -> TimeWindow {
        TimeWindow { start: t(s.0, s.1), end: t(e.0, e.1) }
    }

    fn busy_store() -> MemStore {
        MemStore {
            rooms: vec![room(10, 1, "Room A"), room(11, 1, "Room B")],
            teachers: vec![teacher(20, 1, "Kru Nok")],
            makeups: vec![makeup(1, 1, "Ann", d(2025, 3, 10), t(14, 0), t(15, 0), Some(10), Some(20))],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn marks_only_overlapping_slots_unavailable() {
        let store = busy_store();
        let report = build_day_report(&store, 1, d(2025, 3, 10), range((9, 0), (18, 0)), 60, None)
            .await
            .unwrap();

        let room_a = report.rooms.iter().find(|r| r.room_id == 10).unwrap();
        assert_eq!(room_a.slots.len(), 9);
        for slot in &room_a.slots {
            let busy = slot.start_time == t(14, 0);
            assert_eq!(slot.available, !busy, "slot {:?}", slot.start_time);
            assert_eq!(slot.conflicts.len(), usize::from(busy));
        }

        // Room B is untouched
        let room_b = report.rooms.iter().find(|r| r.room_id == 11).unwrap();
        assert!(room_b.slots.iter().all(|s| s.available));
    }

    #[tokio::test]
    async fn teacher_rows_include_other_branch_commitments() {
        let store = MemStore {
            rooms: vec![room(10, 1, "Room A")],
            teachers: vec![teacher(20, 1, "Kru Nok")],
            // Trial at branch 2 with the same teacher
            trials: vec![trial(1, 2, "Ben", d(2025, 3, 10), t(10, 0), t(11, 0), Some(30), Some(20))],
            ..Default::default()
        };
        let report = build_day_report(&store, 1, d(2025, 3, 10), range((9, 0), (12, 0)), 60, None)
            .await
            .unwrap();
        let t20 = &report.teachers[0];
        assert!(!t20.slots[1].available);
        // The room grid of branch 1 is unaffected by the branch-2 room
        assert!(report.rooms[0].slots.iter().all(|s| s.available));
    }

    #[tokio::test]
    async fn agrees_with_single_booking_check_per_slot() {
        let store = busy_store();
        let report = build_day_report(&store, 1, d(2025, 3, 10), range((9, 0), (18, 0)), 60, None)
            .await
            .unwrap();
        let room_a = report.rooms.iter().find(|r| r.room_id == 10).unwrap();
        for slot in &room_a.slots {
            let res = check_availability(
                &store,
                &AvailabilityRequest {
                    date: d(2025, 3, 10),
                    start_time: slot.start_time,
                    end_time: slot.end_time,
                    branch_id: 1,
                    room_id: Some(10),
                    teacher_id: None,
                    exclude_id: None,
                    exclude_type: None,
                    allow_conflicts: false,
                },
            )
            .await
            .unwrap();
            assert_eq!(res.available, slot.available, "slot {:?}", slot.start_time);
        }
    }

    #[tokio::test]
    async fn holiday_blanks_the_whole_grid() {
        let mut store = busy_store();
        store.holidays = vec![national_holiday(1, d(2025, 3, 10), "Holiday")];
        let report = build_day_report(&store, 1, d(2025, 3, 10), range((9, 0), (12, 0)), 60, None)
            .await
            .unwrap();
        assert_eq!(report.holiday.as_deref(), Some("Holiday"));
        assert!(report.rooms.iter().all(|r| r.slots.iter().all(|s| !s.available)));
        assert!(report.teachers.iter().all(|t| t.slots.iter().all(|s| !s.available)));
    }

    #[tokio::test]
    async fn final_slot_is_clipped_to_range_end() {
        let store = MemStore {
            rooms: vec![room(10, 1, "Room A")],
            ..Default::default()
        };
        let report = build_day_report(&store, 1, d(2025, 3, 10), range((9, 0), (10, 30)), 60, None)
            .await
            .unwrap();
        let slots = &report.rooms[0].slots;
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].start_time, t(10, 0));
        assert_eq!(slots[1].end_time, t(10, 30));
    }

    #[tokio::test]
    async fn zero_width_slots_are_rejected() {
        let store = MemStore::default();
        let err = build_day_report(&store, 1, d(2025, 3, 10), range((9, 0), (12, 0)), 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::BadSlotWidth));
    }
}
