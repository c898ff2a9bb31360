// src/main.rs

use std::env;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

mod db;
mod engine;
mod models;
mod routes;
mod store;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize DB pool
    let pool = db::connect().await?;
    let state = AppState { pool };

    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Root API router
    let api = Router::new()
        // health
        .route("/health", get(routes::health::health))
        // scheduling engine
        .route("/api/v1/availability/check", post(routes::availability::check))
        .route("/api/v1/schedule/project-end-date", post(routes::schedule::project))
        .route(
            "/api/v1/branches/:branch_id/day-report",
            get(routes::reports::day_report),
        )
        // branches
        .route(
            "/api/v1/branches",
            post(routes::branches::create_branch).get(routes::branches::list_branches),
        )
        .route(
            "/api/v1/branches/:id",
            patch(routes::branches::patch_branch).delete(routes::branches::delete_branch),
        )
        // rooms
        .route(
            "/api/v1/branches/:branch_id/rooms",
            post(routes::rooms::create_room).get(routes::rooms::list_rooms_by_branch),
        )
        .route(
            "/api/v1/rooms/:id",
            patch(routes::rooms::patch_room).delete(routes::rooms::delete_room),
        )
        // teachers
        .route(
            "/api/v1/branches/:branch_id/teachers",
            post(routes::teachers::create_teacher).get(routes::teachers::list_teachers_by_branch),
        )
        .route(
            "/api/v1/teachers/:id",
            patch(routes::teachers::patch_teacher).delete(routes::teachers::delete_teacher),
        )
        // holidays
        .route(
            "/api/v1/holidays",
            post(routes::holidays::create_holiday).get(routes::holidays::list_holidays),
        )
        .route("/api/v1/holidays/:id", delete(routes::holidays::delete_holiday))
        // classes (+ session exceptions)
        .route("/api/v1/classes", post(routes::classes::create_class))
        .route(
            "/api/v1/branches/:branch_id/classes",
            get(routes::classes::list_classes_by_branch),
        )
        .route(
            "/api/v1/classes/:id",
            patch(routes::classes::patch_class).delete(routes::classes::delete_class),
        )
        .route(
            "/api/v1/classes/:id/exceptions",
            post(routes::classes::create_exception),
        )
        // makeup classes
        .route("/api/v1/makeup-classes", post(routes::makeups::create_makeup))
        .route(
            "/api/v1/branches/:branch_id/makeup-classes",
            get(routes::makeups::list_makeups_by_branch),
        )
        .route(
            "/api/v1/makeup-classes/:id",
            patch(routes::makeups::patch_makeup).delete(routes::makeups::delete_makeup),
        )
        // trial sessions
        .route("/api/v1/trial-sessions", post(routes::trials::create_trial))
        .route(
            "/api/v1/branches/:branch_id/trial-sessions",
            get(routes::trials::list_trials_by_branch),
        )
        .route(
            "/api/v1/trial-sessions/:id",
            patch(routes::trials::patch_trial).delete(routes::trials::delete_trial),
        )
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Port (axum 0.7 style)
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080); // default 8080

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("API listening on http://127.0.0.1:{port}");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
