pub mod handlers;
mod player;
mod round;

pub use handlers::Gateway;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{sink::SinkExt, stream::StreamExt, Sink};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::broadcast::{BroadcastRoom, ConnectionRx, Room};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::types::ConnectionId;

/// Gateway wired to the in-process broadcast room
pub type AppState = Gateway<BroadcastRoom>;

/// HTTP surface: the room socket at `/broadcast`, static files for everything else
pub fn router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/broadcast", get(ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize and send one frame. Err means the peer is gone.
async fn send_json<S>(sender: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize {:?}: {}", msg, e);
            return Ok(());
        }
    };
    sender
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

impl Gateway<BroadcastRoom> {
    /// Give a new connection an id and its outbound queue
    pub fn open_connection(&self) -> (ConnectionId, ConnectionRx) {
        let connection_id: ConnectionId = ulid::Ulid::new().to_string();
        let outbound = self.room.register(connection_id.clone());
        tracing::info!("Connection {} opened", connection_id);
        (connection_id, outbound)
    }

    /// Leave the room, then drop whatever player the connection declared
    pub async fn close_connection(&self, connection_id: &ConnectionId) {
        self.room.unregister(connection_id);
        self.handle_disconnect(connection_id).await;
        tracing::info!("Connection {} closed", connection_id);
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Registered before reading anything so replies to our own join are queued
    let (connection_id, mut outbound) = state.open_connection();

    loop {
        tokio::select! {
            msg = outbound.recv() => {
                let Some(msg) = msg else { break };
                if send_json(&mut sender, &msg).await.is_err() {
                    break;
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::trace!("Received from {}: {}", connection_id, text.as_str());

                        let result = match ClientMessage::parse(text.as_str()) {
                            Ok(msg) => state.handle_message(&connection_id, msg).await,
                            Err(e) => Err(e),
                        };

                        // Queued behind earlier replies so the connection sees them in order
                        if let Err(e) = result {
                            tracing::warn!("Rejected event from {}: {}", connection_id, e);
                            state.room().send_to(&connection_id, e.to_message());
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error on {}: {}", connection_id, e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    state.close_connection(&connection_id).await;
}
