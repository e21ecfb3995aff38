//! System endpoints: health check and pool limits.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Pool management limits and modes.
#[derive(Debug, Serialize, ToSchema)]
struct LimitsResponse {
    /// Smallest prefix length the gateway will enumerate.
    min_prefix_len: u8,
    /// Whether releasing an unallocated address is rejected.
    strict_release: bool,
    /// Whether directory reservation seeding runs at pool creation.
    directory_seeding: bool,
}

/// `GET /config/limits` — Pool management limits.
#[utoipa::path(
    get,
    path = "/config/limits",
    tag = "System",
    summary = "Pool management limits",
    description = "Returns the enumeration floor, release mode, and directory seeding switch the gateway was started with.",
    responses(
        (status = 200, description = "Configured limits", body = LimitsResponse),
    )
)]
pub async fn limits_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(LimitsResponse {
            min_prefix_len: state.config.min_prefix_len,
            strict_release: state.config.strict_release,
            directory_seeding: state.config.directory.seeding_enabled,
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/limits", get(limits_handler))
}
