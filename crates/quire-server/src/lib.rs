//! quire-server: HTTP API server for the Quire content service
//!
//! This crate provides:
//! - Placeholder data routes (`/select`, `/insert`, `/query`)
//! - Markdown rendering of content entries (`/parse/{id}`)
//! - Content listing and rescans (`/entries`)
//! - Websocket notifications for realtime clients (`/ws`)
//! - Static media under `/media`
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - Request timeouts
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use quire_server::{AppState, ServerConfig, build_app};
//! use quire_store::{Store, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env()?;
//!     let store = Store::open(StoreConfig::new(&config.content_path, &config.db_path)).await?;
//!     let app = build_app(AppState::new(store, config.clone()));
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use app::build_app;
pub use config::{ConfigError, CorsOrigins, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorResponse, GENERIC_ERROR_MESSAGE};
pub use events::{ContentEvent, EventBroadcaster, RescanEvent};
pub use extract::{ValidatedJson, ValidatedQuery};
pub use state::AppState;

// Re-export dependent crates
pub use quire_core;
pub use quire_store;
