//! Round handlers: segment relay and round start.

use super::handlers::Gateway;
use crate::broadcast::Room;
use crate::protocol::ServerMessage;
use crate::types::{ConnectionId, Segment};

impl<R: Room> Gateway<R> {
    /// Record and relay a segment. No authorship check: any connection may
    /// draw, the server only keeps the log for late joiners.
    pub async fn handle_segment(&self, from: &ConnectionId, segment: Segment) {
        let mut registry = self.registry.lock().await;

        let segment = registry.record_segment(segment);
        tracing::debug!("Segment from {} ({} in log)", from, registry.segments().len());
        self.room
            .broadcast_all_except(from, ServerMessage::Segment(segment));
    }

    pub async fn handle_start(&self) {
        let mut registry = self.registry.lock().await;

        if !registry.try_start_round() {
            tracing::debug!(
                "Start ignored: round {:?}, {} player(s)",
                registry.round_state(),
                registry.player_count()
            );
            return;
        }

        tracing::info!("Round started with {} players", registry.player_count());
        self.room.broadcast_all(ServerMessage::Start);
    }
}
