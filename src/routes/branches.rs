// src/routes/branches.rs

use axum::{extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::{query, query_as};
use crate::{models::Branch, AppState};
use super::internal_error;

#[derive(Deserialize)]
pub struct CreateBranchBody {
    pub name: String,
    pub is_active: Option<bool>,
}

pub async fn create_branch(
    State(state): State<AppState>,
    Json(b): Json<CreateBranchBody>,
) -> Result<Json<Branch>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Branch>(
        r#"
        INSERT INTO public.branches(name, is_active)
        VALUES ($1, COALESCE($2, TRUE))
        RETURNING branch_id, name, is_active
        "#,
    )
    .bind(b.name).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_branches(
    State(state): State<AppState>,
) -> Result<Json<Vec<Branch>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Branch>(r#"SELECT * FROM public.branches ORDER BY branch_id"#)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct PatchBranchBody {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn patch_branch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchBranchBody>,
) -> Result<Json<Branch>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Branch>(
        r#"
        UPDATE public.branches SET
          name = COALESCE($2, name),
          is_active = COALESCE($3, is_active)
        WHERE branch_id = $1
        RETURNING branch_id, name, is_active
        "#,
    )
    .bind(id).bind(b.name).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_branch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.branches WHERE branch_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}
