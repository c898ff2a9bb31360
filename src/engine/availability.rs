// src/engine/availability.rs
//
// Point-in-time advisory availability check. Holidays hard-block; room and
// teacher overlaps block by default and downgrade to warnings when the caller
// opts into allow_conflicts. The check-then-book sequence is not
// transactional; strict exclusivity needs a constraint outside this engine.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::store::ScheduleStore;

use super::clock::{fmt_hhmm, hhmm, TimeWindow};
use super::commitments::{
    find_commitments, group_overlaps, Commitment, CommitmentQuery, ExcludeKey, OriginType,
    OverlapGroup,
};
use super::EngineError;

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityRequest {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub branch_id: i64,
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub exclude_id: Option<i64>,
    #[serde(default)]
    pub exclude_type: Option<OriginType>,
    #[serde(default)]
    pub allow_conflicts: bool,
}

impl AvailabilityRequest {
    fn exclude_key(&self) -> Option<ExcludeKey> {
        match (self.exclude_type, self.exclude_id) {
            (Some(origin), Some(id)) => Some(ExcludeKey { origin, id }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Holiday,
    RoomConflict,
    TeacherConflict,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictReason {
    #[serde(rename = "type")]
    pub kind: ConflictType,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityWarning {
    #[serde(rename = "type")]
    pub kind: ConflictType,
    pub message: String,
    pub origin: OriginType,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResult {
    pub available: bool,
    pub reasons: Vec<ConflictReason>,
    pub warnings: Vec<AvailabilityWarning>,
}

pub async fn check_availability<S: ScheduleStore>(
    store: &S,
    req: &AvailabilityRequest,
) -> Result<AvailabilityResult, EngineError> {
    let window = TimeWindow::new(req.start_time, req.end_time)?;

    // 1. Holiday hard block, never downgraded by allow_conflicts.
    let holidays = store
        .holidays_in_range(Some(req.branch_id), req.date, req.date)
        .await?;
    if let Some(h) = holidays.iter().find(|h| h.applies_to(req.branch_id)) {
        return Ok(AvailabilityResult {
            available: false,
            reasons: vec![ConflictReason {
                kind: ConflictType::Holiday,
                message: format!("{} is a holiday ({})", req.date, h.name),
            }],
            warnings: vec![],
        });
    }

    // 2./3. Room axis is branch-scoped; the teacher axis spans branches
    // because a person cannot teach in two places at once.
    let exclude = req.exclude_key();
    let room_q = CommitmentQuery {
        branch_id: Some(req.branch_id),
        room_id: req.room_id,
        teacher_id: None,
        start: req.date,
        end: req.date,
        exclude,
        as_of: None,
    };
    let teacher_q = CommitmentQuery {
        branch_id: None,
        room_id: None,
        teacher_id: req.teacher_id,
        start: req.date,
        end: req.date,
        exclude,
        as_of: None,
    };
    let (room_commitments, teacher_commitments) = tokio::try_join!(
        axis_commitments(store, room_q, req.room_id.is_some()),
        axis_commitments(store, teacher_q, req.teacher_id.is_some()),
    )?;

    let room_hits: Vec<Commitment> = room_commitments
        .into_iter()
        .filter(|c| c.window().overlaps(&window))
        .collect();
    let teacher_hits: Vec<Commitment> = teacher_commitments
        .into_iter()
        .filter(|c| c.window().overlaps(&window))
        .collect();

    // 4. Blocking reasons by default, warnings under allow_conflicts.
    let mut reasons = Vec::new();
    let mut warnings = Vec::new();
    for (kind, hits) in [
        (ConflictType::RoomConflict, room_hits),
        (ConflictType::TeacherConflict, teacher_hits),
    ] {
        for group in group_overlaps(&hits) {
            let message = conflict_message(kind, &group);
            if req.allow_conflicts {
                warnings.push(AvailabilityWarning {
                    kind,
                    message,
                    origin: group.origin,
                    count: group.count,
                });
            } else {
                reasons.push(ConflictReason { kind, message });
            }
        }
    }

    Ok(AvailabilityResult { available: reasons.is_empty(), reasons, warnings })
}

async fn axis_commitments<S: ScheduleStore>(
    store: &S,
    q: CommitmentQuery,
    enabled: bool,
) -> Result<Vec<Commitment>, EngineError> {
    if !enabled {
        return Ok(Vec::new());
    }
    find_commitments(store, &q).await
}

fn conflict_message(kind: ConflictType, group: &OverlapGroup) -> String {
    let who = match kind {
        ConflictType::RoomConflict => "room occupied",
        ConflictType::TeacherConflict => "teacher busy",
        ConflictType::Holiday => "holiday",
    };
    format!(
        "{} {}-{}: {}",
        who,
        fmt_hhmm(group.start_time),
        fmt_hhmm(group.end_time),
        group.label
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem::{class, d, makeup, national_holiday, t, trial, MemStore};

    fn request(date: chrono::NaiveDate, start: (u32, u32), end: (u32, u32)) -> AvailabilityRequest {
        AvailabilityRequest {
            date,
            start_time: t(start.0, start.1),
            end_time: t(end.0, end.1),
            branch_id: 1,
            room_id: Some(10),
            teacher_id: Some(20),
            exclude_id: None,
            exclude_type: None,
            allow_conflicts: false,
        }
    }

    #[tokio::test]
    async fn clean_booking_is_available() {
        let store = MemStore::default();
        let res = check_availability(&store, &request(d(2025, 3, 10), (14, 0), (15, 0)))
            .await
            .unwrap();
        assert!(res.available);
        assert!(res.reasons.is_empty());
        assert!(res.warnings.is_empty());
    }

    #[tokio::test]
    async fn holiday_blocks_regardless_of_allow_conflicts() {
        let store = MemStore {
            holidays: vec![national_holiday(1, d(2025, 4, 13), "Songkran")],
            makeups: vec![makeup(1, 1, "Ann", d(2025, 4, 13), t(14, 0), t(15, 0), Some(10), Some(20))],
            ..Default::default()
        };
        for allow in [false, true] {
            let mut req = request(d(2025, 4, 13), (14, 0), (15, 0));
            req.allow_conflicts = allow;
            let res = check_availability(&store, &req).await.unwrap();
            assert!(!res.available, "allow_conflicts={allow}");
            assert_eq!(res.reasons.len(), 1);
            assert_eq!(res.reasons[0].kind, ConflictType::Holiday);
        }
    }

    #[tokio::test]
    async fn room_conflict_blocks_by_default_and_downgrades_when_allowed() {
        let store = MemStore {
            makeups: vec![makeup(1, 1, "Ann", d(2025, 3, 10), t(14, 0), t(15, 0), Some(10), Some(99))],
            ..Default::default()
        };

        let req = request(d(2025, 3, 10), (14, 30), (15, 30));
        let blocked = check_availability(&store, &req).await.unwrap();
        assert!(!blocked.available);
        assert_eq!(blocked.reasons.len(), 1);
        assert_eq!(blocked.reasons[0].kind, ConflictType::RoomConflict);

        let mut soft = req.clone();
        soft.allow_conflicts = true;
        let warned = check_availability(&store, &soft).await.unwrap();
        assert!(warned.available);
        assert!(warned.reasons.is_empty());
        assert_eq!(warned.warnings.len(), 1);
        assert_eq!(warned.warnings[0].kind, ConflictType::RoomConflict);
    }

    #[tokio::test]
    async fn touching_windows_do_not_conflict() {
        let store = MemStore {
            makeups: vec![makeup(1, 1, "Ann", d(2025, 3, 10), t(13, 0), t(14, 0), Some(10), Some(20))],
            ..Default::default()
        };
        let res = check_availability(&store, &request(d(2025, 3, 10), (14, 0), (15, 0)))
            .await
            .unwrap();
        assert!(res.available);
    }

    #[tokio::test]
    async fn teacher_conflicts_cross_branches() {
        // Teacher 20 has a trial at branch 2; booking them at branch 1 at the
        // same time must flag a teacher conflict.
        let store = MemStore {
            trials: vec![trial(1, 2, "Ben", d(2025, 3, 10), t(14, 0), t(15, 0), Some(30), Some(20))],
            ..Default::default()
        };
        let res = check_availability(&store, &request(d(2025, 3, 10), (14, 0), (15, 0)))
            .await
            .unwrap();
        assert!(!res.available);
        assert_eq!(res.reasons.len(), 1);
        assert_eq!(res.reasons[0].kind, ConflictType::TeacherConflict);
    }

    #[tokio::test]
    async fn editing_a_booking_does_not_conflict_with_itself() {
        let store = MemStore {
            makeups: vec![makeup(7, 1, "Ann", d(2025, 3, 10), t(14, 0), t(15, 0), Some(10), Some(20))],
            ..Default::default()
        };
        let mut req = request(d(2025, 3, 10), (14, 0), (15, 0));
        req.exclude_id = Some(7);
        req.exclude_type = Some(OriginType::Makeup);
        let res = check_availability(&store, &req).await.unwrap();
        assert!(res.available, "{:?}", res.reasons);
    }

    #[tokio::test]
    async fn recurring_class_session_occupies_its_slot() {
        let store = MemStore {
            classes: vec![class(1, 1, "Math A", 10, 20, vec![1, 3, 5], t(14, 0), t(15, 0), d(2025, 1, 6), 12)],
            ..Default::default()
        };
        // Wed 2025-01-08 14:00 clashes on both axes
        let res = check_availability(&store, &request(d(2025, 1, 8), (14, 30), (15, 30)))
            .await
            .unwrap();
        assert!(!res.available);
        let kinds: Vec<ConflictType> = res.reasons.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&ConflictType::RoomConflict));
        assert!(kinds.contains(&ConflictType::TeacherConflict));
    }

    #[tokio::test]
    async fn shared_slot_warning_carries_count() {
        let store = MemStore {
            makeups: vec![
                makeup(1, 1, "Ann", d(2025, 3, 10), t(14, 0), t(15, 0), Some(10), Some(20)),
                makeup(2, 1, "Ben", d(2025, 3, 10), t(14, 0), t(15, 0), Some(10), Some(20)),
            ],
            ..Default::default()
        };
        let mut req = request(d(2025, 3, 10), (14, 0), (15, 0));
        req.teacher_id = None;
        req.allow_conflicts = true;
        let res = check_availability(&store, &req).await.unwrap();
        assert!(res.available);
        assert_eq!(res.warnings.len(), 1);
        assert_eq!(res.warnings[0].count, 2);
        assert_eq!(res.warnings[0].origin, OriginType::Makeup);
    }

    #[tokio::test]
    async fn inverted_window_is_rejected_before_any_query() {
        let store = MemStore::default();
        let err = check_availability(&store, &request(d(2025, 3, 10), (15, 0), (14, 0)))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn store_failure_propagates_instead_of_assuming_available() {
        let store = MemStore {
            fail_makeups: true,
            ..Default::default()
        };
        let err = check_availability(&store, &request(d(2025, 3, 10), (14, 0), (15, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
    }
}
