//! Liveness endpoint with a summary of loaded content.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Entries in the current content snapshot.
    pub entries: usize,
    /// Connected realtime clients.
    pub clients: usize,
    /// Rendered documents held in the cache.
    pub cached_renders: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        entries: state.content().len().await,
        clients: state.broadcaster().client_count().await,
        cached_renders: state.store().cache().len(),
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
