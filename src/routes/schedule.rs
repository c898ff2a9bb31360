// src/routes/schedule.rs

use axum::{extract::State, Json};

use crate::engine::projection::{project_end_date, ProjectionInput, ProjectionResult};
use crate::store::PgStore;
use crate::AppState;
use super::engine_error;

/// POST /api/v1/schedule/project-end-date
pub async fn project(
    State(state): State<AppState>,
    Json(input): Json<ProjectionInput>,
) -> Result<Json<ProjectionResult>, (axum::http::StatusCode, String)> {
    let store = PgStore::new(state.pool.clone());
    let result = project_end_date(&store, &input).await.map_err(engine_error)?;
    Ok(Json(result))
}
