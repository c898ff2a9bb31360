// src/routes/classes.rs

use axum::{extract::{Path, State}, Json};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::{query, query_as};

use crate::engine::clock::{hhmm, TimeWindow};
use crate::engine::projection::{project_end_date, ProjectionInput};
use crate::models::{ClassRecord, SessionException};
use crate::store::PgStore;
use crate::AppState;
use super::{engine_error, internal_error};

#[derive(Deserialize)]
pub struct CreateClassBody {
    pub branch_id: i64,
    pub name: String,
    pub subject: Option<String>,
    pub subject_color: Option<String>,
    pub room_id: i64,
    pub teacher_id: i64,
    pub days_of_week: Vec<i32>,
    #[serde(with = "hhmm")] pub start_time: NaiveTime,
    #[serde(with = "hhmm")] pub end_time: NaiveTime,
    pub start_date: NaiveDate,
    pub total_sessions: i32,
}

/// Creating a class validates the weekly pattern and runs the end-date
/// projection so the caller sees the full planned calendar up front.
pub async fn create_class(
    State(state): State<AppState>,
    Json(b): Json<CreateClassBody>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    TimeWindow::new(b.start_time, b.end_time).map_err(engine_error)?;

    let store = PgStore::new(state.pool.clone());
    let projection = project_end_date(
        &store,
        &ProjectionInput {
            start_date: b.start_date,
            days_of_week: b.days_of_week.clone(),
            total_sessions: b.total_sessions,
            branch_id: b.branch_id,
        },
    )
    .await
    .map_err(engine_error)?;

    let row = query_as::<_, ClassRecord>(
        r#"
        INSERT INTO public.classes
          (branch_id, name, subject, subject_color, room_id, teacher_id,
           days_of_week, start_time, end_time, start_date, total_sessions, status)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,'active')
        RETURNING class_id, branch_id, name, subject, subject_color, room_id, teacher_id,
                  days_of_week, start_time, end_time, start_date, total_sessions, status
        "#,
    )
    .bind(b.branch_id).bind(b.name).bind(b.subject).bind(b.subject_color)
    .bind(b.room_id).bind(b.teacher_id).bind(b.days_of_week)
    .bind(b.start_time).bind(b.end_time).bind(b.start_date).bind(b.total_sessions)
    .fetch_one(&state.pool).await.map_err(internal_error)?;

    Ok(Json(serde_json::json!({
        "class": row,
        "projected_end_date": projection.end_date,
        "holidays_skipped": projection.holidays_skipped,
        "holiday_aware": projection.holiday_aware,
    })))
}

pub async fn list_classes_by_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
) -> Result<Json<Vec<ClassRecord>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, ClassRecord>(
        r#"SELECT * FROM public.classes WHERE branch_id=$1 ORDER BY class_id"#)
        .bind(branch_id).fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct PatchClassBody {
    pub name: Option<String>,
    pub room_id: Option<i64>,
    pub teacher_id: Option<i64>,
    #[serde(default, with = "hhmm_opt")] pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt")] pub end_time: Option<NaiveTime>,
    pub status: Option<String>,
}

// Optional variant of the hhmm adapter for patch bodies.
mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let s = Option::<String>::deserialize(d)?;
        s.map(|s| {
            NaiveTime::parse_from_str(&s, "%H:%M")
                .map_err(|_| serde::de::Error::custom(format!("invalid time '{s}': expected HH:MM")))
        })
        .transpose()
    }
}

pub async fn patch_class(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchClassBody>,
) -> Result<Json<ClassRecord>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, ClassRecord>(
        r#"
        UPDATE public.classes SET
          name = COALESCE($2, name),
          room_id = COALESCE($3, room_id),
          teacher_id = COALESCE($4, teacher_id),
          start_time = COALESCE($5, start_time),
          end_time = COALESCE($6, end_time),
          status = COALESCE($7, status)
        WHERE class_id = $1
        RETURNING class_id, branch_id, name, subject, subject_color, room_id, teacher_id,
                  days_of_week, start_time, end_time, start_date, total_sessions, status
        "#,
    )
    .bind(id).bind(b.name).bind(b.room_id).bind(b.teacher_id)
    .bind(b.start_time).bind(b.end_time).bind(b.status)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.classes WHERE class_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}

#[derive(Deserialize)]
pub struct CreateExceptionBody {
    pub date: NaiveDate,
    pub reason: Option<String>,
}

/// Marks one session occurrence as cancelled/rescheduled away. The engine
/// stops treating that date as busy; the session number is covered by its
/// replacement makeup.
pub async fn create_exception(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
    Json(b): Json<CreateExceptionBody>,
) -> Result<Json<SessionException>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, SessionException>(
        r#"
        INSERT INTO public.class_session_exceptions(class_id, date, reason)
        VALUES ($1,$2,$3)
        ON CONFLICT (class_id, date) DO UPDATE SET reason = EXCLUDED.reason
        RETURNING exception_id, class_id, date, reason
        "#,
    )
    .bind(class_id).bind(b.date).bind(b.reason)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}
