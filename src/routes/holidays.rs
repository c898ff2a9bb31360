// src/routes/holidays.rs

use axum::{extract::{Path, Query, State}, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{query, query_as};
use crate::{models::Holiday, AppState};
use super::internal_error;

#[derive(Deserialize)]
pub struct CreateHolidayBody {
    pub date: NaiveDate,
    pub name: String,
    pub holiday_type: String, // national|branch
    #[serde(default)] pub branch_ids: Vec<i64>,
}

pub async fn create_holiday(
    State(state): State<AppState>,
    Json(b): Json<CreateHolidayBody>,
) -> Result<Json<Holiday>, (axum::http::StatusCode, String)> {
    if b.holiday_type != "national" && b.holiday_type != "branch" {
        return Err((
            axum::http::StatusCode::BAD_REQUEST,
            format!("holiday_type must be 'national' or 'branch', got '{}'", b.holiday_type),
        ));
    }
    let row = query_as::<_, Holiday>(
        r#"
        INSERT INTO public.holidays(date, name, holiday_type, branch_ids)
        VALUES ($1,$2,$3,$4)
        RETURNING holiday_id, date, name, holiday_type, branch_ids
        "#,
    )
    .bind(b.date).bind(b.name).bind(b.holiday_type).bind(b.branch_ids)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct ListQ {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

pub async fn list_holidays(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<Holiday>>, (axum::http::StatusCode, String)> {
    let rows = match (q.start, q.end) {
        (Some(s), Some(e)) => {
            query_as::<_, Holiday>(
                r#"SELECT * FROM public.holidays WHERE date BETWEEN $1 AND $2 ORDER BY date"#)
                .bind(s).bind(e).fetch_all(&state.pool).await.map_err(internal_error)?
        }
        _ => {
            query_as::<_, Holiday>(r#"SELECT * FROM public.holidays ORDER BY date"#)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
    };
    Ok(Json(rows))
}

pub async fn delete_holiday(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.holidays WHERE holiday_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}
