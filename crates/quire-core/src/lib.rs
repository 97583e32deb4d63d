//! quire-core: Core types for the Quire content service
//!
//! This crate provides:
//! - Entry types for markdown files loaded from a content directory
//! - Node/Segment types for the tree view
//! - Validated request envelopes shared by the server and the CLI
//!
//! # Usage
//!
//! ```rust,ignore
//! use quire_core::{Entry, EntryId, Node};
//!
//! let entry = Entry::new(EntryId::new(0), "intro.md".into(), source);
//! let node = Node::from_entry(&entry);
//! ```

pub mod node;
pub mod request;
pub mod types;

pub use node::{Node, Segment, parse_timestamp};
pub use request::{
    EntryFilter, EntryQuery, InsertBody, InsertRecord, QueryBody, Validate, ValidationError,
};
pub use types::{ContentHash, Entry, EntryId, EntryIdParseError, TitleSource};
