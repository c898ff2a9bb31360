use axum::http::StatusCode;

use crate::engine::EngineError;

pub mod availability;
pub mod branches;
pub mod classes;
pub mod health;
pub mod holidays;
pub mod makeups;
pub mod reports;
pub mod rooms;
pub mod schedule;
pub mod teachers;
pub mod trials;

// Common error mappers
pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

pub fn engine_error(e: EngineError) -> (StatusCode, String) {
    if e.is_validation() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else {
        internal_error(e)
    }
}
