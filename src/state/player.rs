use super::{RegistryError, SessionRegistry};
use crate::types::*;

impl SessionRegistry {
    /// Register a player for `connection_id` and return the state it must be
    /// synchronized with. The snapshot is taken before the new player is
    /// added, so it never contains the joiner itself.
    ///
    /// A repeated join from the same connection replaces its earlier record.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        color: Color,
        connection_id: ConnectionId,
    ) -> Result<SessionSnapshot, RegistryError> {
        if self.config.reject_duplicate_ids && self.id_held_elsewhere(&player_id, &connection_id) {
            return Err(RegistryError::DuplicatePlayerId(player_id));
        }

        if let Some(previous) = self.detach(&connection_id) {
            tracing::debug!(
                "Connection {} re-joined, replacing player {}",
                connection_id,
                previous.id
            );
        }

        let snapshot = self.snapshot();

        self.by_player_id
            .entry(player_id.clone())
            .or_default()
            .push(connection_id.clone());
        self.players.insert(
            connection_id.clone(),
            Player {
                id: player_id,
                color,
                connection_id,
            },
        );

        Ok(snapshot)
    }

    /// Remove the earliest-joined player carrying `player_id`.
    /// Returns whether anything was removed.
    pub fn remove_by_player_id(&mut self, player_id: &str) -> bool {
        let Some(connection_id) = self
            .by_player_id
            .get(player_id)
            .and_then(|connections| connections.first())
            .cloned()
        else {
            return false;
        };

        let removed = self.detach(&connection_id).is_some();
        if removed {
            self.end_round_if_decided();
        }
        removed
    }

    /// Remove whatever player the closing connection declared, if any.
    pub fn remove_by_connection_id(&mut self, connection_id: &str) -> Option<PlayerId> {
        let player = self.detach(connection_id)?;
        self.end_round_if_decided();
        Some(player.id)
    }

    fn id_held_elsewhere(&self, player_id: &str, connection_id: &str) -> bool {
        self.by_player_id
            .get(player_id)
            .is_some_and(|connections| connections.iter().any(|c| c != connection_id))
    }

    /// Drop a connection's record from both the primary map and the id index.
    fn detach(&mut self, connection_id: &str) -> Option<Player> {
        let player = self.players.remove(connection_id)?;

        if let Some(connections) = self.by_player_id.get_mut(&player.id) {
            connections.retain(|c| c != connection_id);
            if connections.is_empty() {
                self.by_player_id.remove(&player.id);
            }
        }

        Some(player)
    }
}
