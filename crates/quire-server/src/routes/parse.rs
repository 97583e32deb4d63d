//! Markdown rendering endpoint.
//!
//! GET /parse/{id} - Render the entry at list position `id` to HTML.
//!
//! Positions come from the name-sorted file list at the last scan, so an id
//! only means the same file while the content directory is unchanged.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use quire_core::{EntryId, EntryIdParseError};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /parse/{id} - Render an entry.
///
/// The file is read fresh from disk (with bounded retry) and rendered
/// through the render cache.
///
/// # Response
///
/// - 200 OK: the HTML as a JSON string
/// - 400 Bad Request: `id` is not a non-negative integer
/// - 404 Not Found: no entry at that position, including integers too large
///   to be a position at all
async fn parse_entry(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<String>> {
    let id = parse_id(&raw_id)?;

    let (entry, html) = state.store().render_entry(id).await?;
    tracing::debug!(entry_id = %id, path = %entry.path.display(), bytes = html.len(), "Rendered entry");

    Ok(Json(html.to_string()))
}

fn parse_id(raw: &str) -> ApiResult<EntryId> {
    raw.parse().map_err(|e: EntryIdParseError| {
        let digits = raw.trim();
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            ApiError::NotFound(format!("entry {digits} does not exist"))
        } else {
            ApiError::BadRequest(e.to_string())
        }
    })
}

/// Build rendering routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/parse/{id}", get(parse_entry))
}
