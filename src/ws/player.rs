//! Player lifecycle handlers: join, dead and disconnect.

use super::handlers::Gateway;
use crate::broadcast::Room;
use crate::protocol::{ProtocolError, ServerMessage};
use crate::types::{Color, ConnectionId, PlayerId};

impl<R: Room> Gateway<R> {
    pub async fn handle_join(
        &self,
        from: &ConnectionId,
        player_id: PlayerId,
        color: Color,
    ) -> Result<(), ProtocolError> {
        let mut registry = self.registry.lock().await;

        let snapshot = registry.join(player_id.clone(), color, from.clone())?;
        tracing::info!("Player {} joined on connection {}", player_id, from);

        self.room.send_to(from, ServerMessage::State(snapshot));
        self.room.broadcast_all(ServerMessage::PlayerCount {
            n: registry.player_count(),
        });
        Ok(())
    }

    pub async fn handle_dead(&self, from: &ConnectionId, player_id: PlayerId) {
        let mut registry = self.registry.lock().await;

        let removed = registry.remove_by_player_id(&player_id);
        if !removed && !self.always_emit_dead {
            tracing::debug!("Ignoring dead for unknown player {}", player_id);
            return;
        }

        tracing::info!("Player {} died (reported by {})", player_id, from);
        self.room
            .broadcast_all_except(from, ServerMessage::Dead { id: player_id });
        self.room.broadcast_all(ServerMessage::PlayerCount {
            n: registry.player_count(),
        });
    }

    /// Called once the connection is gone. A connection that never joined
    /// produces nothing.
    pub async fn handle_disconnect(&self, connection_id: &ConnectionId) {
        let mut registry = self.registry.lock().await;

        let Some(player_id) = registry.remove_by_connection_id(connection_id) else {
            return;
        };

        tracing::info!(
            "Player {} left (connection {} closed)",
            player_id,
            connection_id
        );
        self.room
            .broadcast_all(ServerMessage::Dead { id: player_id });
        self.room.broadcast_all(ServerMessage::PlayerCount {
            n: registry.player_count(),
        });
    }
}
