// src/routes/reports.rs

use axum::{extract::{Path, Query, State}, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::engine::clock::TimeWindow;
use crate::engine::report::{build_day_report, DayReport};
use crate::store::PgStore;
use crate::AppState;
use super::engine_error;

fn default_start() -> String { "09:00".into() }
fn default_end() -> String { "21:00".into() }
fn default_slot() -> u32 { 60 }

#[derive(Deserialize)]
pub struct DayReportQ {
    pub date: NaiveDate,
    #[serde(default = "default_start")] pub start: String,
    #[serde(default = "default_end")] pub end: String,
    #[serde(default = "default_slot")] pub slot_minutes: u32,
}

/// GET /api/v1/branches/:branch_id/day-report
pub async fn day_report(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
    Query(q): Query<DayReportQ>,
) -> Result<Json<DayReport>, (axum::http::StatusCode, String)> {
    let range = TimeWindow::parse(&q.start, &q.end).map_err(engine_error)?;

    let store = PgStore::new(state.pool.clone());
    let today = chrono::Local::now().date_naive();
    let report = build_day_report(&store, branch_id, q.date, range, q.slot_minutes, Some(today))
        .await
        .map_err(engine_error)?;
    Ok(Json(report))
}
