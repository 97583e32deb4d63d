//! API error types with JSON responses.
//!
//! Internal failures are answered with 400 and a fixed message; the cause is
//! written to the log only and never reaches the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use quire_core::ValidationError;
use quire_store::StoreError;

/// Message returned for every internal failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Something happened...";

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request payload failed validation (400).
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Malformed request outside the body, e.g. a bad path parameter (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Unexpected failure (400, generic message).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::Internal(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message safe to show to the client.
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => GENERIC_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EntryNotFound(id) => Self::NotFound(format!("entry {id} does not exist")),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {e}"))
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub msg: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            tracing::error!(error = %cause, "Request failed with internal error");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code().to_string(),
            msg: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
