//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok" or "degraded")
    pub status: String,
    /// Module name ("libris-meta")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Catalogued books, absent when the store cannot be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books: Option<i64>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let books = match libris_common::db::count_books(&state.db).await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read the store");
            None
        }
    };

    Json(HealthResponse {
        status: if books.is_some() { "ok" } else { "degraded" }.to_string(),
        module: "libris-meta".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        books,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
