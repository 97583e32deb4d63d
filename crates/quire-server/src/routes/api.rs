//! Placeholder data routes: `/select`, `/insert`, `/query`.
//!
//! - GET /select - Static acknowledgement
//! - PUT /insert - Record an insert and notify realtime clients
//! - GET /query - Validate a query envelope and acknowledge it

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};

use quire_core::{InsertBody, InsertRecord, QueryBody};

use crate::error::ApiResult;
use crate::events::ContentEvent;
use crate::extract::ValidatedJson;
use crate::state::AppState;

/// Body of the `/select` acknowledgement.
pub const SELECT_ACK: &str = "select: ok";

/// GET /select - Static acknowledgement.
///
/// Reserved for a future query capability.
async fn select() -> &'static str {
    SELECT_ACK
}

/// PUT /insert - Accept a payload and broadcast it.
///
/// # Response
///
/// - 201 Created: empty body; exactly one `inserted` event was broadcast
/// - 400 Bad Request: validation failure, or `Something happened...` for
///   any internal failure
async fn insert(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<InsertBody>,
) -> ApiResult<StatusCode> {
    let record = InsertRecord::new(body);
    state.store().record_insert(&record).await?;

    let record_id = record.id;
    let receivers = state.notify(&ContentEvent::Inserted(record)).await?;

    tracing::info!(record_id = %record_id, receivers, "Accepted insert");
    Ok(StatusCode::CREATED)
}

/// GET /query - Validate a query envelope.
///
/// # Response
///
/// - 200 OK: plain-text acknowledgement
/// - 400 Bad Request: structured validation error
async fn query(ValidatedJson(body): ValidatedJson<QueryBody>) -> String {
    tracing::debug!(username = %body.username, "Query received");
    format!("query accepted for {}", body.username.trim())
}

/// Build placeholder data routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/select", get(select))
        .route("/insert", put(insert))
        .route("/query", get(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_select_ack() {
        assert_eq!(select().await, SELECT_ACK);
    }

    #[tokio::test]
    async fn test_query_trims_username() {
        let body = QueryBody {
            username: "  ada ".into(),
        };
        assert_eq!(query(ValidatedJson(body)).await, "query accepted for ada");
    }
}
