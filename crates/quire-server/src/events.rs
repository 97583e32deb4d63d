//! Event broadcasting for real-time notifications.
//!
//! This module provides the registry of connected websocket clients and the
//! best-effort broadcast used after mutating routes.
//!
//! # Architecture
//!
//! - One bounded `mpsc` channel per client; the websocket task drains it
//! - `broadcast` snapshots the client set under a read lock, releases the
//!   lock, then sends, so registration and removal never wait on delivery
//! - Closed channels are pruned after the send pass
//! - A client whose buffer is full misses that event (at-most-once)
//!
//! # Event Types
//!
//! - `inserted`: Published after `PUT /insert`
//! - `rescanned`: Published after `POST /entries/rescan`

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use quire_core::InsertRecord;

/// Per-client buffer of undelivered events.
pub const DEFAULT_CLIENT_BUFFER: usize = 64;

/// Identifier of a connected client.
pub type ClientId = Uuid;

/// Serialized event as pushed to clients.
pub type Payload = Arc<str>;

// ============================================================================
// Event Types
// ============================================================================

/// An event that can be broadcast to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentEvent {
    /// An insert was accepted.
    Inserted(InsertRecord),
    /// The content directory was rescanned.
    Rescanned(RescanEvent),
}

impl ContentEvent {
    /// Wire name of the event, as found in its `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inserted(_) => "inserted",
            Self::Rescanned(_) => "rescanned",
        }
    }
}

/// Event data for a content rescan.
#[derive(Debug, Clone, Serialize)]
pub struct RescanEvent {
    /// Number of entries after the rescan.
    pub entries: usize,
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Registry of connected clients.
#[derive(Debug)]
pub struct EventBroadcaster {
    clients: RwLock<HashMap<ClientId, mpsc::Sender<Payload>>>,
    buffer: usize,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    /// Create a new broadcaster with the default per-client buffer.
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_CLIENT_BUFFER)
    }

    /// Create a new broadcaster with a custom per-client buffer.
    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            buffer: buffer.max(1),
        }
    }

    /// Register a client.
    ///
    /// Returns the client id and the receiver its connection task drains.
    pub async fn register(&self) -> (ClientId, mpsc::Receiver<Payload>) {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(self.buffer);
        self.clients.write().await.insert(id, sender);

        tracing::debug!(client_id = %id, "Registered realtime client");
        (id, receiver)
    }

    /// Remove a client. Returns false if it was already gone.
    pub async fn unregister(&self, id: ClientId) -> bool {
        let removed = self.clients.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!(client_id = %id, "Unregistered realtime client");
        }
        removed
    }

    /// Push an event to every connected client.
    ///
    /// Returns the number of clients the event was queued for. Clients
    /// whose connection has closed are dropped; delivery is best-effort.
    pub async fn broadcast(&self, event: &ContentEvent) -> Result<usize, serde_json::Error> {
        let payload: Payload = Arc::from(serde_json::to_string(event)?);

        let snapshot: Vec<(ClientId, mpsc::Sender<Payload>)> = self
            .clients
            .read()
            .await
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, sender) in snapshot {
            match sender.try_send(Arc::clone(&payload)) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(client_id = %id, "Realtime client lagging, event dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut clients = self.clients.write().await;
            for id in &closed {
                clients.remove(id);
            }
            tracing::debug!(dropped = closed.len(), "Dropped closed realtime clients");
        }

        tracing::trace!(receivers = delivered, "Broadcast event");
        Ok(delivered)
    }

    /// Get the number of connected clients.
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Drop every client; their connection tasks see the channel close and
    /// send a close frame.
    pub async fn shutdown(&self) -> usize {
        let mut clients = self.clients.write().await;
        let count = clients.len();
        clients.clear();
        tracing::info!(count, "Closed all realtime clients");
        count
    }
}

// ============================================================================
// Tests
// ============================================================================
