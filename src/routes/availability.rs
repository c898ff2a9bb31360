// src/routes/availability.rs

use axum::{extract::State, Json};

use crate::engine::availability::{check_availability, AvailabilityRequest, AvailabilityResult};
use crate::store::PgStore;
use crate::AppState;
use super::engine_error;

/// POST /api/v1/availability/check
///
/// Advisory point-in-time check; booking is a separate step, so two callers
/// racing the same slot can both pass. Strict exclusivity needs a constraint
/// at the storage layer.
pub async fn check(
    State(state): State<AppState>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResult>, (axum::http::StatusCode, String)> {
    let store = PgStore::new(state.pool.clone());
    let result = check_availability(&store, &req).await.map_err(engine_error)?;
    Ok(Json(result))
}
