//! quire-store: Storage layer for the Quire content service
//!
//! This crate provides:
//! - Scanning of a markdown content directory into an indexed entry list
//! - Bounded-retry file reads
//! - A render cache keyed by content hash
//! - An append-only insert log in the storage directory
//!
//! # Usage
//!
//! ```rust,ignore
//! use quire_store::{Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("content", "db")).await?;
//! let (entry, html) = store.render_entry(EntryId::new(0)).await?;
//! ```

pub mod cache;
pub mod content;
pub mod error;
pub mod insert_log;
pub mod retry;
pub mod store;

pub use cache::{CacheConfig, CacheStats, RenderCache};
pub use content::ContentStore;
pub use error::{StoreError, StoreResult};
pub use insert_log::InsertLog;
pub use retry::RetryConfig;
pub use store::{Store, StoreConfig};

// Re-export quire-core for downstream crates
pub use quire_core;
