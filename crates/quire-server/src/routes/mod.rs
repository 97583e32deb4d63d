//! Route definitions for the HTTP API.

pub mod api;
pub mod entries;
pub mod health;
pub mod parse;
pub mod ws;

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.config().media_path);

    Router::new()
        .merge(health::routes())
        .merge(api::routes())
        .merge(parse::routes())
        .merge(entries::routes())
        .merge(ws::routes())
        .nest_service("/media", media)
        .with_state(state)
}
