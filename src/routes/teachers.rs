// src/routes/teachers.rs

use axum::{extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::{query, query_as};
use crate::{models::Teacher, AppState};
use super::internal_error;

#[derive(Deserialize)]
pub struct CreateTeacherBody {
    pub name: String,
    pub is_active: Option<bool>,
}

pub async fn create_teacher(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
    Json(b): Json<CreateTeacherBody>,
) -> Result<Json<Teacher>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Teacher>(
        r#"
        INSERT INTO public.teachers(branch_id, name, is_active)
        VALUES ($1,$2, COALESCE($3, TRUE))
        RETURNING teacher_id, branch_id, name, is_active
        "#,
    )
    .bind(branch_id).bind(b.name).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_teachers_by_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
) -> Result<Json<Vec<Teacher>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Teacher>(
        r#"SELECT * FROM public.teachers WHERE branch_id=$1 ORDER BY name"#)
        .bind(branch_id).fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct PatchTeacherBody {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn patch_teacher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchTeacherBody>,
) -> Result<Json<Teacher>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Teacher>(
        r#"
        UPDATE public.teachers SET
          name = COALESCE($2, name),
          is_active = COALESCE($3, is_active)
        WHERE teacher_id = $1
        RETURNING teacher_id, branch_id, name, is_active
        "#,
    )
    .bind(id).bind(b.name).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.teachers WHERE teacher_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}
