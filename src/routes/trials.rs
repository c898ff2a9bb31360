// src/routes/trials.rs

use axum::http::StatusCode;
use axum::{extract::{Path, State}, Json};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::{query, query_as};

use crate::engine::availability::{check_availability, AvailabilityRequest};
use crate::engine::clock::hhmm;
use crate::models::TrialSession;
use crate::store::PgStore;
use crate::AppState;
use super::{engine_error, internal_error};

#[derive(Deserialize)]
pub struct CreateTrialBody {
    pub branch_id: i64,
    pub student_name: String,
    pub subject: Option<String>,
    pub scheduled_date: NaiveDate,
    #[serde(with = "hhmm")] pub start_time: NaiveTime,
    #[serde(with = "hhmm")] pub end_time: NaiveTime,
    pub room_id: Option<i64>,
    pub teacher_id: Option<i64>,
}

// Trials never override conflicts; a prospect should not be shown into a
// slot staff already committed elsewhere.
pub async fn create_trial(
    State(state): State<AppState>,
    Json(b): Json<CreateTrialBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, String)> {
    let store = PgStore::new(state.pool.clone());
    let verdict = check_availability(
        &store,
        &AvailabilityRequest {
            date: b.scheduled_date,
            start_time: b.start_time,
            end_time: b.end_time,
            branch_id: b.branch_id,
            room_id: b.room_id,
            teacher_id: b.teacher_id,
            exclude_id: None,
            exclude_type: None,
            allow_conflicts: false,
        },
    )
    .await
    .map_err(engine_error)?;

    if !verdict.available {
        return Ok((
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "booked": false, "reasons": verdict.reasons })),
        ));
    }

    let row = query_as::<_, TrialSession>(
        r#"
        INSERT INTO public.trial_sessions
          (branch_id, student_name, subject, scheduled_date, start_time, end_time,
           room_id, teacher_id, status)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,'scheduled')
        RETURNING trial_id, branch_id, student_name, subject, scheduled_date,
                  start_time, end_time, room_id, teacher_id, status
        "#,
    )
    .bind(b.branch_id).bind(b.student_name).bind(b.subject).bind(b.scheduled_date)
    .bind(b.start_time).bind(b.end_time).bind(b.room_id).bind(b.teacher_id)
    .fetch_one(&state.pool).await.map_err(internal_error)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "booked": true, "trial": row })),
    ))
}

pub async fn list_trials_by_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
) -> Result<Json<Vec<TrialSession>>, (StatusCode, String)> {
    let rows = query_as::<_, TrialSession>(
        r#"SELECT * FROM public.trial_sessions WHERE branch_id=$1 ORDER BY scheduled_date, start_time"#)
        .bind(branch_id).fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct PatchTrialBody {
    pub status: Option<String>, // scheduled|completed|cancelled|no_show
}

pub async fn patch_trial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchTrialBody>,
) -> Result<Json<TrialSession>, (StatusCode, String)> {
    let row = query_as::<_, TrialSession>(
        r#"
        UPDATE public.trial_sessions SET
          status = COALESCE($2, status)
        WHERE trial_id = $1
        RETURNING trial_id, branch_id, student_name, subject, scheduled_date,
                  start_time, end_time, room_id, teacher_id, status
        "#,
    )
    .bind(id).bind(b.status)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_trial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let res = query(r#"DELETE FROM public.trial_sessions WHERE trial_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}
