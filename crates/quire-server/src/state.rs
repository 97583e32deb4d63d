//! Shared handler state.

use std::sync::Arc;

use quire_store::{ContentStore, Store};

use crate::config::ServerConfig;
use crate::error::ApiResult;
use crate::events::{ContentEvent, EventBroadcaster};

/// Cloneable handle passed to every handler through `State<AppState>`.
///
/// The realtime client registry lives here rather than in a global, so each
/// application instance (and each test) has its own set of clients.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    config: Arc<ServerConfig>,
    broadcaster: Arc<EventBroadcaster>,
}

impl AppState {
    pub fn new(store: Store, config: ServerConfig) -> Self {
        Self::with_broadcaster(store, config, EventBroadcaster::new())
    }

    /// Build state around a preconfigured broadcaster.
    pub fn with_broadcaster(
        store: Store,
        config: ServerConfig,
        broadcaster: EventBroadcaster,
    ) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            broadcaster: Arc::new(broadcaster),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Shortcut for the content index.
    pub fn content(&self) -> &ContentStore {
        self.store.content()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }

    /// Push `event` to every realtime client; returns how many were reached.
    pub async fn notify(&self, event: &ContentEvent) -> ApiResult<usize> {
        let receivers = self.broadcaster.broadcast(event).await?;
        tracing::debug!(receivers, kind = event.kind(), "Notified realtime clients");
        Ok(receivers)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("broadcaster", &self.broadcaster)
            .finish_non_exhaustive()
    }
}
