//! Realtime notification endpoint.
//!
//! GET /ws - Upgrade to a websocket that receives every broadcast
//! [`ContentEvent`](crate::events::ContentEvent) as a JSON text frame.
//! Inbound frames other than close are ignored.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};

use crate::events::EventBroadcaster;
use crate::state::AppState;

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let broadcaster = Arc::clone(state.broadcaster());
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

/// Drive one connection until either side goes away.
///
/// A send task drains the client's channel into the socket and sends a
/// close frame once the broadcaster drops the channel (shutdown). The
/// current task reads inbound frames only to notice disconnects.
async fn handle_socket(socket: WebSocket, broadcaster: Arc<EventBroadcaster>) {
    let (client_id, mut rx) = broadcaster.register().await;
    tracing::info!(client_id = %client_id, "Realtime client connected");

    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sink.send(Message::Text(payload.as_ref().into())).await.is_err() {
                tracing::debug!(client_id = %client_id, "Realtime sink closed");
                return;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(client_id = %client_id, error = %e, "Realtime receive error");
                break;
            }
        }
    }

    broadcaster.unregister(client_id).await;
    send_task.abort();
    tracing::info!(client_id = %client_id, "Realtime client disconnected");
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}
