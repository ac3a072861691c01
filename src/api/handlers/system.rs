//! System endpoints: health check and subscription statistics.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::RegistryStats;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
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

/// `GET /subscriptions/stats`: Live notification counters.
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/stats",
    tag = "System",
    summary = "Subscription statistics",
    description = "Returns the number of watched zip codes and live subscribers, plus publish, delivery and drop counters.",
    responses(
        (status = 200, description = "Registry statistics", body = RegistryStats),
    )
)]
pub async fn subscription_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.registry().stats())
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

/// System routes mounted under /api/v1.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/subscriptions/stats", get(subscription_stats))
}
