//! Content listing routes.
//!
//! - GET /entries - List entries, optionally only those with a heading title
//! - GET /entries/tree - Display tree of entries with timestamped segments
//! - POST /entries/rescan - Re-read the content directory

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;

use quire_core::{Entry, EntryId, EntryQuery, Node, TitleSource};

use crate::error::ApiResult;
use crate::events::{ContentEvent, RescanEvent};
use crate::extract::ValidatedQuery;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Listing row.
#[derive(Debug, Serialize)]
pub struct EntrySummary {
    pub id: EntryId,
    pub title: String,
    pub title_source: TitleSource,
    /// File name relative to the content directory.
    pub file: String,
    /// Markdown source as of the last scan.
    pub source: String,
}

impl From<&Entry> for EntrySummary {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            title: entry.title.clone(),
            title_source: entry.title_source,
            file: entry
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source: entry.source.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<EntrySummary>,
}

#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Serialize)]
pub struct RescanResponse {
    pub entries: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /entries - List entries from the last scan.
async fn list_entries(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<EntryQuery>,
) -> Json<EntryListResponse> {
    let entries = state.content().list(query.filter).await;
    Json(EntryListResponse {
        entries: entries.iter().map(EntrySummary::from).collect(),
    })
}

/// GET /entries/tree - Build display nodes from the last scan.
async fn entry_tree(State(state): State<AppState>) -> Json<TreeResponse> {
    let snapshot = state.content().entries().await;
    Json(TreeResponse {
        nodes: snapshot.iter().map(Node::from_entry).collect(),
    })
}

/// POST /entries/rescan - Re-read the content directory and notify clients.
///
/// Cached renders stay valid: they are keyed by content hash.
async fn rescan(State(state): State<AppState>) -> ApiResult<Json<RescanResponse>> {
    let entries = state.content().rescan().await?;

    let event = ContentEvent::Rescanned(RescanEvent {
        entries,
        timestamp: Utc::now(),
    });
    state.notify(&event).await?;

    Ok(Json(RescanResponse { entries }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(list_entries))
        .route("/entries/tree", get(entry_tree))
        .route("/entries/rescan", post(rescan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_summary_uses_file_name() {
        let entry = Entry::new(
            EntryId::new(2),
            PathBuf::from("/srv/content/notes.md"),
            "plain text".into(),
        );
        let summary = EntrySummary::from(&entry);
        assert_eq!(summary.id, EntryId::new(2));
        assert_eq!(summary.file, "notes.md");
        assert_eq!(summary.title, "notes");
        assert_eq!(summary.title_source, TitleSource::FileName);
        assert_eq!(summary.source, "plain text");
    }
}
