use super::SessionRegistry;
use crate::types::*;

impl SessionRegistry {
    /// Append a segment to the current round's log and hand it back for relay.
    pub fn record_segment(&mut self, segment: Segment) -> Segment {
        self.segments.push(segment.clone());
        segment
    }

    /// NotStarted -> Started, guarded by the player count.
    /// Flag flip and log clear happen in the same call.
    pub fn try_start_round(&mut self) -> bool {
        if self.round == RoundState::Started || self.players.len() < MIN_PLAYERS_TO_START {
            return false;
        }

        self.round = RoundState::Started;
        self.segments.clear();
        true
    }

    /// Only active with `reset_round_on_last_player`. The log is left alone;
    /// the next start clears it.
    pub(super) fn end_round_if_decided(&mut self) {
        if self.config.reset_round_on_last_player
            && self.round == RoundState::Started
            && self.players.len() < MIN_PLAYERS_TO_START
        {
            tracing::info!(
                "Round over: {} player(s) left, accepting a new start",
                self.players.len()
            );
            self.round = RoundState::NotStarted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry_with(players: usize, config: RegistryConfig) -> SessionRegistry {
        let mut registry = SessionRegistry::new(config);
        for i in 0..players {
            registry
                .join(format!("p{i}"), "red".into(), format!("c{i}"))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_segments_keep_insertion_order() {
        let mut registry = registry_with(1, RegistryConfig::default());
        for i in 0..5 {
            let echoed = registry.record_segment(json!({"i": i}));
            assert_eq!(echoed, json!({"i": i}));
        }

        let order: Vec<_> = registry.segments().iter().map(|s| s["i"].clone()).collect();
        assert_eq!(order, vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);

        let snapshot = registry
            .join("late".into(), "blue".into(), "late-conn".into())
            .unwrap();
        assert_eq!(snapshot.segments, registry.segments());
    }

    #[test]
    fn test_start_requires_two_players() {
        let mut registry = registry_with(1, RegistryConfig::default());
        registry.record_segment(json!({"x": 1}));

        assert!(!registry.try_start_round());
        assert_eq!(registry.round_state(), RoundState::NotStarted);
        assert_eq!(registry.segments().len(), 1);
    }

    #[test]
    fn test_start_clears_log_exactly_once() {
        let mut registry = registry_with(2, RegistryConfig::default());
        registry.record_segment(json!({"x": 1}));

        assert!(registry.try_start_round());
        assert_eq!(registry.round_state(), RoundState::Started);
        assert!(registry.segments().is_empty());

        registry.record_segment(json!({"x": 2}));
        assert!(!registry.try_start_round());
        assert_eq!(registry.segments(), &[json!({"x": 2})]);
    }

    #[test]
    fn test_round_stays_started_after_players_leave() {
        let mut registry = registry_with(2, RegistryConfig::default());
        assert!(registry.try_start_round());

        assert!(registry.remove_by_player_id("p0"));
        assert_eq!(registry.round_state(), RoundState::Started);

        registry
            .join("p9".into(), "blue".into(), "c9".into())
            .unwrap();
        assert!(!registry.try_start_round());
    }

    #[test]
    fn test_round_resets_on_last_player_when_configured() {
        let config = RegistryConfig {
            reset_round_on_last_player: true,
            ..RegistryConfig::default()
        };
        let mut registry = registry_with(3, config);
        assert!(registry.try_start_round());
        registry.record_segment(json!({"x": 1}));

        assert!(registry.remove_by_player_id("p0"));
        assert_eq!(registry.round_state(), RoundState::Started);

        assert_eq!(registry.remove_by_connection_id("c1"), Some("p1".into()));
        assert_eq!(registry.round_state(), RoundState::NotStarted);
        // Log survives until the next start
        assert_eq!(registry.segments().len(), 1);

        registry
            .join("p3".into(), "blue".into(), "c3".into())
            .unwrap();
        assert!(registry.try_start_round());
        assert!(registry.segments().is_empty());
    }
}
