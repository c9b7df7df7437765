use crate::state::RegistryError;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Events a client may send on its connection.
///
/// Serialized as `{"event": "...", "data": ...}`. Inbound frames go through
/// [`ClientMessage::parse`], which checks each payload's shape before anything
/// reaches the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    Join { id: PlayerId, color: Color },
    Segment(Segment),
    Dead { id: PlayerId },
    Start,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Sent once to a connection right after its join
    State(SessionSnapshot),
    Segment(Segment),
    Dead {
        id: PlayerId,
    },
    PlayerCount {
        n: usize,
    },
    Start,
    Error {
        code: String,
        msg: String,
    },
}

/// Reasons an inbound event is refused. Only the sender hears about it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid message format: {0}")]
    Parse(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Invalid payload for {event}: {reason}")]
    InvalidPayload { event: &'static str, reason: String },

    #[error("Player id {0:?} is already in use")]
    DuplicatePlayerId(PlayerId),
}

impl ProtocolError {
    pub fn code(&self) -> &'static str {
        match self {
            ProtocolError::Parse(_) => "PARSE_ERROR",
            ProtocolError::UnknownEvent(_) => "UNKNOWN_EVENT",
            ProtocolError::InvalidPayload { .. } => "INVALID_PAYLOAD",
            ProtocolError::DuplicatePlayerId(_) => "DUPLICATE_PLAYER_ID",
        }
    }

    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::Error {
            code: self.code().to_string(),
            msg: self.to_string(),
        }
    }
}

impl From<RegistryError> for ProtocolError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicatePlayerId(id) => ProtocolError::DuplicatePlayerId(id),
        }
    }
}

#[derive(Deserialize)]
struct RawEvent {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct JoinPayload {
    id: PlayerId,
    color: Color,
}

#[derive(Deserialize)]
struct DeadPayload {
    id: PlayerId,
}

impl ClientMessage {
    /// Parse and shape-check one inbound text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let raw: RawEvent =
            serde_json::from_str(text).map_err(|e| ProtocolError::Parse(e.to_string()))?;

        match raw.event.as_str() {
            "join" => {
                let JoinPayload { id, color } = payload("join", raw.data)?;
                Ok(ClientMessage::Join {
                    id: non_empty_id("join", id)?,
                    color,
                })
            }
            "segment" => {
                if !raw.data.is_object() {
                    return Err(ProtocolError::InvalidPayload {
                        event: "segment",
                        reason: "segment must be a JSON object".to_string(),
                    });
                }
                Ok(ClientMessage::Segment(raw.data))
            }
            "dead" => {
                let DeadPayload { id } = payload("dead", raw.data)?;
                Ok(ClientMessage::Dead {
                    id: non_empty_id("dead", id)?,
                })
            }
            // Payload carries nothing
            "start" => Ok(ClientMessage::Start),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

fn payload<T: serde::de::DeserializeOwned>(
    event: &'static str,
    data: serde_json::Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|e| ProtocolError::InvalidPayload {
        event,
        reason: e.to_string(),
    })
}

fn non_empty_id(event: &'static str, id: PlayerId) -> Result<PlayerId, ProtocolError> {
    if id.trim().is_empty() {
        return Err(ProtocolError::InvalidPayload {
            event,
            reason: "id must not be empty".to_string(),
        });
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_join() {
        let msg = ClientMessage::parse(r#"{"event":"join","data":{"id":"p1","color":"red"}}"#);
        assert_eq!(
            msg,
            Ok(ClientMessage::Join {
                id: "p1".into(),
                color: "red".into()
            })
        );
    }

    #[test]
    fn test_parse_segment_keeps_payload_verbatim() {
        let msg = ClientMessage::parse(
            r#"{"event":"segment","data":{"x":0,"y":0,"x2":1,"y2":1,"meta":{"w":3}}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Segment(json!({"x":0,"y":0,"x2":1,"y2":1,"meta":{"w":3}}))
        );
    }

    #[test]
    fn test_parse_start_ignores_payload() {
        for text in [
            r#"{"event":"start"}"#,
            r#"{"event":"start","data":null}"#,
            r#"{"event":"start","data":{}}"#,
        ] {
            assert_eq!(ClientMessage::parse(text), Ok(ClientMessage::Start));
        }
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        let cases = [
            ("not json", "PARSE_ERROR"),
            (r#"{"data":{}}"#, "PARSE_ERROR"),
            (r#"{"event":"fly"}"#, "UNKNOWN_EVENT"),
            (r#"{"event":"join","data":{"id":"p1"}}"#, "INVALID_PAYLOAD"),
            (r#"{"event":"join","data":{"id":7,"color":"red"}}"#, "INVALID_PAYLOAD"),
            (r#"{"event":"join","data":{"id":"  ","color":"red"}}"#, "INVALID_PAYLOAD"),
            (r#"{"event":"dead"}"#, "INVALID_PAYLOAD"),
            (r#"{"event":"segment","data":[1,2]}"#, "INVALID_PAYLOAD"),
            (r#"{"event":"segment"}"#, "INVALID_PAYLOAD"),
        ];

        for (text, code) in cases {
            let err = ClientMessage::parse(text).unwrap_err();
            assert_eq!(err.code(), code, "input: {text}");
        }
    }

    #[test]
    fn test_client_message_serialization_parses_back() {
        let msg = ClientMessage::Dead { id: "p2".into() };
        let text = serde_json::to_string(&msg).unwrap();
        assert_eq!(ClientMessage::parse(&text), Ok(msg));

        let text = serde_json::to_string(&ClientMessage::Start).unwrap();
        assert_eq!(ClientMessage::parse(&text), Ok(ClientMessage::Start));
    }

    #[test]
    fn test_server_message_wire_format() {
        assert_eq!(
            serde_json::to_value(ServerMessage::PlayerCount { n: 2 }).unwrap(),
            json!({"event": "playerCount", "data": {"n": 2}})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::Start).unwrap(),
            json!({"event": "start"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::Segment(json!({"x": 1}))).unwrap(),
            json!({"event": "segment", "data": {"x": 1}})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::State(SessionSnapshot::default())).unwrap(),
            json!({"event": "state", "data": {"players": {}, "lines": []}})
        );
    }

    #[test]
    fn test_error_message_carries_code() {
        let err = ProtocolError::from(RegistryError::DuplicatePlayerId("p1".into()));
        match err.to_message() {
            ServerMessage::Error { code, msg } => {
                assert_eq!(code, "DUPLICATE_PLAYER_ID");
                assert!(msg.contains("p1"));
            }
            other => panic!("Expected Error message, got {other:?}"),
        }
    }
}
