// src/routes/rooms.rs

use axum::{extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::{query, query_as};
use crate::{models::Room, AppState};
use super::internal_error;

#[derive(Deserialize)]
pub struct CreateRoomBody {
    pub name: String,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

pub async fn create_room(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
    Json(b): Json<CreateRoomBody>,
) -> Result<Json<Room>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Room>(
        r#"
        INSERT INTO public.rooms(branch_id, name, capacity, is_active)
        VALUES ($1,$2,$3, COALESCE($4, TRUE))
        RETURNING room_id, branch_id, name, capacity, is_active
        "#,
    )
    .bind(branch_id).bind(b.name).bind(b.capacity).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_rooms_by_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
) -> Result<Json<Vec<Room>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Room>(
        r#"SELECT * FROM public.rooms WHERE branch_id=$1 ORDER BY name"#)
        .bind(branch_id).fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct PatchRoomBody {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

pub async fn patch_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchRoomBody>,
) -> Result<Json<Room>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Room>(
        r#"
        UPDATE public.rooms SET
          name = COALESCE($2, name),
          capacity = COALESCE($3, capacity),
          is_active = COALESCE($4, is_active)
        WHERE room_id = $1
        RETURNING room_id, branch_id, name, capacity, is_active
        "#,
    )
    .bind(id).bind(b.name).bind(b.capacity).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.rooms WHERE room_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}
