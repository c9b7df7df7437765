use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type ConnectionId = String;
pub type PlayerId = String;
pub type Color = String;

/// One drawn path fragment. The server never looks inside it.
pub type Segment = serde_json::Value;

/// Fewest players a round can start with
pub const MIN_PLAYERS_TO_START: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub color: Color,
    /// Connection that declared this player; used for removal on disconnect
    pub connection_id: ConnectionId,
}

/// Public per-player attributes included in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerInfo {
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundState {
    #[default]
    NotStarted,
    Started,
}

/// Full state sent to a connection right after it joins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionSnapshot {
    pub players: std::collections::HashMap<PlayerId, PlayerInfo>,
    /// Segments of the current round, in draw order
    #[serde(rename = "lines")]
    pub segments: Vec<Segment>,
}

/// Behaviour toggles for the session registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryConfig {
    /// Refuse a join whose player id is already held by another connection
    pub reject_duplicate_ids: bool,
    /// Return the round to NotStarted once fewer than two players remain
    pub reset_round_on_last_player: bool,
}
