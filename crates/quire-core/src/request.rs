//! Request envelopes and validation.
//!
//! Every route body is a typed payload that is checked by [`Validate`]
//! before it reaches business logic. Shape errors (missing fields, wrong
//! types, unknown fields) are reported by serde and wrapped in
//! [`ValidationError::Malformed`] by the server's extractor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted username length.
pub const MAX_USERNAME_LEN: usize = 64;

/// Maximum accepted insert content length in bytes.
pub const MAX_CONTENT_LEN: usize = 64 * 1024;

/// Reasons a request payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Body could not be deserialized into the expected shape.
    #[error("malformed request body: {0}")]
    Malformed(String),

    /// Field is present but empty.
    #[error("field `{0}` must not be empty")]
    Empty(&'static str),

    /// Field is longer than allowed.
    #[error("field `{field}` exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Checks invariants serde cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Client request filter for `GET /query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryBody {
    pub username: String,
}

impl Validate for QueryBody {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("username", &self.username, MAX_USERNAME_LEN)
    }
}

/// Payload for `PUT /insert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsertBody {
    pub username: String,
    pub content: String,
}

impl Validate for InsertBody {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("username", &self.username, MAX_USERNAME_LEN)?;
        if self.content.len() > MAX_CONTENT_LEN {
            return Err(ValidationError::TooLong {
                field: "content",
                max: MAX_CONTENT_LEN,
            });
        }
        Ok(())
    }
}

/// An accepted insert, as written to the insert log and broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertRecord {
    pub id: Uuid,
    pub username: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

impl InsertRecord {
    /// Stamps a validated body with an id and receive time.
    pub fn new(body: InsertBody) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: body.username,
            content: body.content,
            received_at: Utc::now(),
        }
    }
}

/// Which entries a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryFilter {
    /// Every entry.
    #[default]
    All,
    /// Only entries with a level-1 heading.
    Titled,
}

/// Query string for `GET /entries`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryQuery {
    #[serde(default)]
    pub filter: EntryFilter,
}
