mod player;
mod round;

use crate::types::*;
use std::collections::HashMap;

/// Errors a registry operation can report instead of mutating state
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("player id {0:?} is already in use")]
    DuplicatePlayerId(PlayerId),
}

/// Authoritative session state: who is alive, what was drawn this round,
/// and whether a round is running.
///
/// Players are keyed by connection so a closing socket resolves to at most one
/// record. `by_player_id` keeps the connections holding each logical id in
/// join order, which gives `dead {id}` its first-match semantics.
///
/// The registry does no I/O and never awaits; callers serialize access to it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    players: HashMap<ConnectionId, Player>,
    by_player_id: HashMap<PlayerId, Vec<ConnectionId>>,
    segments: Vec<Segment>,
    round: RoundState,
    config: RegistryConfig,
}

impl SessionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn round_state(&self) -> RoundState {
        self.round
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn contains_player_id(&self, player_id: &str) -> bool {
        self.by_player_id.contains_key(player_id)
    }

    /// Current players and segments.
    ///
    /// When several connections share an id, the most recent join wins.
    pub fn snapshot(&self) -> SessionSnapshot {
        let players = self
            .by_player_id
            .iter()
            .filter_map(|(id, connections)| {
                let player = self.players.get(connections.last()?)?;
                Some((
                    id.clone(),
                    PlayerInfo {
                        color: player.color.clone(),
                    },
                ))
            })
            .collect();

        SessionSnapshot {
            players,
            segments: self.segments.clone(),
        }
    }
}
