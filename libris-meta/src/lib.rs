//! libris-meta library interface
//!
//! Book metadata resolution pipeline plus the calling layer around it:
//! intake and backfill services, the HTTP API and its shared state.

pub mod api;
pub mod author;
pub mod classifier;
pub mod config;
pub mod cover_search;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod services;
pub mod store;
pub mod types;

pub use crate::error::{ApiError, ApiResult};
pub use crate::orchestrator::Orchestrator;

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (intake writes, health reads)
    pub db: SqlitePool,
    /// Resolution pipeline
    pub orchestrator: Arc<Orchestrator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            db,
            orchestrator,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::book_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
