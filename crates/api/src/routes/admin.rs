use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::health::HealthReport;
use crate::state::AppState;

/// Build metadata payload.
#[derive(Serialize)]
pub struct BuildInfo {
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub name: &'static str,
}

/// GET /__health -- full health report. Always 200; `ok` carries the verdict.
async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health.report(&state.config, Utc::now()).await)
}

/// GET /__gtg -- 200 when healthy, 503 with the failure text otherwise.
async fn good_to_go(State(state): State<AppState>) -> impl IntoResponse {
    match state.health.check().await {
        Ok(_) => (StatusCode::OK, "OK".to_string()),
        Err(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
    }
}

async fn ping() -> &'static str {
    "pong"
}

async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        name: env!("CARGO_PKG_NAME"),
    })
}

/// Mount the operational endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/__health", get(health))
        .route("/__gtg", get(good_to_go))
        .route("/__ping", get(ping))
        .route("/__build-info", get(build_info))
}
