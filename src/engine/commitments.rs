// src/engine/commitments.rs
//
// Normalizes the three busy-interval sources (recurring class sessions,
// scheduled makeups, scheduled trials) into Commitment records. Commitments
// are derived per query and never persisted, so every check reflects current
// data.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::ClassRecord;
use crate::store::ScheduleStore;

use super::clock::{hhmm, TimeWindow};
use super::holidays::HolidaySet;
use super::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginType {
    Class,
    Makeup,
    Trial,
}

/// Identity of the record a commitment came from. A booking being edited
/// passes its own key so it never conflicts with itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeKey {
    pub origin: OriginType,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum CommitmentKind {
    Class {
        class_id: i64,
        session_number: i32,
        total_sessions: i32,
        is_completed: bool,
    },
    Makeup {
        makeup_id: i64,
        student: String,
    },
    Trial {
        trial_id: i64,
        student: String,
    },
}

impl CommitmentKind {
    pub fn origin(&self) -> OriginType {
        match self {
            CommitmentKind::Class { .. } => OriginType::Class,
            CommitmentKind::Makeup { .. } => OriginType::Makeup,
            CommitmentKind::Trial { .. } => OriginType::Trial,
        }
    }

    fn source_id(&self) -> i64 {
        match self {
            CommitmentKind::Class { class_id, .. } => *class_id,
            CommitmentKind::Makeup { makeup_id, .. } => *makeup_id,
            CommitmentKind::Trial { trial_id, .. } => *trial_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Commitment {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub branch_id: i64,
    pub room_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub label: String,
    pub subject: Option<String>,
    pub subject_color: Option<String>,
    #[serde(flatten)]
    pub kind: CommitmentKind,
}

impl Commitment {
    pub fn exclude_key(&self) -> ExcludeKey {
        ExcludeKey { origin: self.kind.origin(), id: self.kind.source_id() }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow { start: self.start_time, end: self.end_time }
    }
}

/// Query for busy intervals. `branch_id: None` spans all branches, which the
/// teacher axis needs (a teacher busy at one branch is busy everywhere).
/// Room/teacher filters are OR-composed: a commitment matches when either
/// requested axis matches. With neither set, everything in range matches.
#[derive(Debug, Clone)]
pub struct CommitmentQuery {
    pub branch_id: Option<i64>,
    pub room_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub exclude: Option<ExcludeKey>,
    /// Reference date for marking past class sessions completed. The engine
    /// never reads the wall clock itself.
    pub as_of: Option<NaiveDate>,
}

pub async fn find_commitments<S: ScheduleStore>(
    store: &S,
    q: &CommitmentQuery,
) -> Result<Vec<Commitment>, EngineError> {
    // The three sources are independent reads, fetched in parallel.
    let (classes, makeups, trials) = tokio::try_join!(
        store.active_classes(q.branch_id),
        store.scheduled_makeups_in_range(q.branch_id, q.start, q.end),
        store.scheduled_trials_in_range(q.branch_id, q.start, q.end),
    )?;

    let mut out: Vec<Commitment> = Vec::new();

    for m in makeups {
        out.push(Commitment {
            date: m.makeup_date,
            start_time: m.start_time,
            end_time: m.end_time,
            branch_id: m.branch_id,
            room_id: m.room_id,
            teacher_id: m.teacher_id,
            label: format!("Makeup: {}", m.student_name),
            subject: None,
            subject_color: None,
            kind: CommitmentKind::Makeup { makeup_id: m.makeup_id, student: m.student_name },
        });
    }

    for t in trials {
        out.push(Commitment {
            date: t.scheduled_date,
            start_time: t.start_time,
            end_time: t.end_time,
            branch_id: t.branch_id,
            room_id: t.room_id,
            teacher_id: t.teacher_id,
            label: format!("Trial: {}", t.student_name),
            subject: t.subject.clone(),
            subject_color: None,
            kind: CommitmentKind::Trial { trial_id: t.trial_id, student: t.student_name },
        });
    }

    if !classes.is_empty() {
        // Session numbering counts from each class's start date, so holidays
        // and exceptions are needed back to the earliest start in play.
        let earliest = classes
            .iter()
            .map(|c| c.start_date)
            .min()
            .unwrap_or(q.start)
            .min(q.start);
        let (holiday_rows, exception_rows) = tokio::try_join!(
            store.holidays_in_range(q.branch_id, earliest, q.end),
            store.session_exceptions_in_range(q.branch_id, earliest, q.end),
        )?;

        let exceptions: HashSet<(i64, NaiveDate)> =
            exception_rows.iter().map(|e| (e.class_id, e.date)).collect();
        let mut holiday_sets: HashMap<i64, HolidaySet> = HashMap::new();

        for class in &classes {
            let set = holiday_sets
                .entry(class.branch_id)
                .or_insert_with(|| HolidaySet::for_branch(&holiday_rows, class.branch_id));
            expand_class(class, set, &exceptions, q, &mut out);
        }
    }

    out.retain(|c| matches_axes(c, q.room_id, q.teacher_id));
    if let Some(key) = q.exclude {
        out.retain(|c| c.exclude_key() != key);
    }
    Ok(out)
}

fn matches_axes(c: &Commitment, room_id: Option<i64>, teacher_id: Option<i64>) -> bool {
    if room_id.is_none() && teacher_id.is_none() {
        return true;
    }
    let room_hit = room_id.is_some() && c.room_id == room_id;
    let teacher_hit = teacher_id.is_some() && c.teacher_id == teacher_id;
    room_hit || teacher_hit
}

/// Walks a class's recurring weekly pattern from its start date. A holiday
/// shifts the remaining schedule (the session number is not consumed); a
/// session exception consumes its number without emitting a commitment, since
/// the replacement makeup covers that occurrence.
fn expand_class(
    class: &ClassRecord,
    holidays: &HolidaySet,
    exceptions: &HashSet<(i64, NaiveDate)>,
    q: &CommitmentQuery,
    out: &mut Vec<Commitment>,
) {
    let days: HashSet<i32> = class.days_of_week.iter().copied().collect();
    if days.is_empty() || class.total_sessions <= 0 {
        return;
    }

    let mut session = 0;
    let mut date = class.start_date;
    while session < class.total_sessions && date <= q.end {
        let weekday = date.weekday().num_days_from_sunday() as i32;
        if days.contains(&weekday) && !holidays.contains(date) {
            session += 1;
            if date >= q.start && !exceptions.contains(&(class.class_id, date)) {
                out.push(Commitment {
                    date,
                    start_time: class.start_time,
                    end_time: class.end_time,
                    branch_id: class.branch_id,
                    room_id: Some(class.room_id),
                    teacher_id: Some(class.teacher_id),
                    label: format!("{} (session {}/{})", class.name, session, class.total_sessions),
                    subject: class.subject.clone(),
                    subject_color: class.subject_color.clone(),
                    kind: CommitmentKind::Class {
                        class_id: class.class_id,
                        session_number: session,
                        total_sessions: class.total_sessions,
                        is_completed: q.as_of.is_some_and(|today| date < today),
                    },
                });
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
}

/// Presentation grouping: commitments sharing origin, time window, and room
/// collapse into one entry with a count, so several makeup students in one
/// slot read as "3 students" instead of three conflicts.
#[derive(Debug, Clone)]
pub struct OverlapGroup {
    pub origin: OriginType,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub label: String,
    pub count: usize,
}

pub fn group_overlaps(commitments: &[Commitment]) -> Vec<OverlapGroup> {
    let mut groups: Vec<OverlapGroup> = Vec::new();
    for c in commitments {
        let origin = c.kind.origin();
        if let Some(g) = groups.iter_mut().find(|g| {
            g.origin == origin
                && g.date == c.date
                && g.start_time == c.start_time
                && g.end_time == c.end_time
                && g.room_id == c.room_id
        }) {
            g.count += 1;
            if origin == OriginType::Makeup {
                g.label = format!("Makeup ({} students)", g.count);
            }
        } else {
            groups.push(OverlapGroup {
                origin,
                date: c.date,
                start_time: c.start_time,
                end_time: c.end_time,
                room_id: c.room_id,
                teacher_id: c.teacher_id,
                label: c.label.clone(),
                count: 1,
            });
        }
    }
    groups
}
