//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol. Outbound messages use Serde's
//! tagged enum; inbound frames are decoded in two steps so malformed JSON
//! and unknown types can be told apart.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AppError, FrameError};
use crate::types::RoomCode;

/// Client → Server message
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Create a new room, the sender becomes its first member
    Create,
    /// Join an existing room by code
    Join { code: Option<RoomCode> },
    /// Game payload to relay to the other member.
    ///
    /// `raw` is the frame exactly as received; it is forwarded untouched.
    Game { code: Option<RoomCode>, raw: String },
}

/// Typed view of the fields we route on. Everything else is ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    Create {},
    Join {
        #[serde(default, deserialize_with = "lenient_code")]
        code: Option<String>,
    },
    Game {
        #[serde(default, deserialize_with = "lenient_code")]
        code: Option<String>,
    },
}

/// Accept codes sent as strings or as bare numbers
fn lenient_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl ClientMessage {
    /// Decode one inbound text frame
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| FrameError::Malformed(e.to_string()))?;

        // serde would also accept variant indices and sequences here
        if !value.get("type").is_some_and(Value::is_string) {
            return Err(FrameError::UnknownType);
        }

        let envelope: Envelope =
            serde_json::from_value(value).map_err(|_| FrameError::UnknownType)?;

        Ok(match envelope {
            Envelope::Create {} => ClientMessage::Create,
            Envelope::Join { code } => ClientMessage::Join {
                code: code.map(RoomCode::from_string),
            },
            Envelope::Game { code } => ClientMessage::Game {
                code: code.map(RoomCode::from_string),
                raw: text.to_string(),
            },
        })
    }

    /// Decode a binary frame; only UTF-8 JSON is accepted
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let text = std::str::from_utf8(bytes).map_err(|e| FrameError::Malformed(e.to_string()))?;
        Self::decode(text)
    }
}

/// Server → Client message
///
/// Relayed `game` frames are not represented here; they go out verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Room created, carries the code to share with the opponent
    Created { code: String },
    /// Join accepted
    Joined { code: String },
    /// Both members present, the match begins
    Start,
    /// Request rejected
    Error { msg: String },
}

impl ServerMessage {
    pub fn error(msg: impl Into<String>) -> Self {
        ServerMessage::Error { msg: msg.into() }
    }
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidOrFullCode => ServerMessage::error("Invalid or full code"),
            AppError::NoCodeAvailable => ServerMessage::error("No room code available"),
            // Fatal errors are not typically converted (connection closes)
            _ => ServerMessage::error("Internal error"),
        }
    }
}

impl From<FrameError> for ServerMessage {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::UnknownType => ServerMessage::error("Unknown message type"),
            FrameError::Malformed(_) => ServerMessage::error("Malformed frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_create_ignores_extra_fields() {
        let msg = ClientMessage::decode(r#"{"type":"create","code":"123456","x":1}"#).unwrap();
        assert_eq!(msg, ClientMessage::Create);
    }

    #[test]
    fn test_decode_join() {
        let msg = ClientMessage::decode(r#"{"type": "join", "code": "482913"}"#).unwrap();
        match msg {
            ClientMessage::Join { code } => {
                assert_eq!(code, Some(RoomCode::from_string("482913".to_string())))
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_decode_numeric_code() {
        let msg = ClientMessage::decode(r#"{"type":"join","code":482913}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Join {
                code: Some(RoomCode::from_string("482913".to_string()))
            }
        );
    }

    #[test]
    fn test_decode_join_without_code() {
        let msg = ClientMessage::decode(r#"{"type":"join"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Join { code: None });

        let msg = ClientMessage::decode(r#"{"type":"join","code":[1]}"#).unwrap();
        assert_eq!(msg, ClientMessage::Join { code: None });
    }

    #[test]
    fn test_decode_game_keeps_raw_frame() {
        let text = r#"{"type":"game","code":"482913","q":1,"nested":{"a":[1,2]}}"#;
        match ClientMessage::decode(text).unwrap() {
            ClientMessage::Game { code, raw } => {
                assert_eq!(code.unwrap().as_str(), "482913");
                assert_eq!(raw, text);
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_decode_unknown_type() {
        for text in [
            r#"{"type":"leave"}"#,
            r#"{"code":"123456"}"#,
            r#"{"type":7}"#,
            r#"{"type":1,"code":"123456"}"#,
            r#"["join","123456"]"#,
            r#"[1,2,3]"#,
            r#""create""#,
        ] {
            assert!(
                matches!(ClientMessage::decode(text), Err(FrameError::UnknownType)),
                "{text}"
            );
        }
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            ClientMessage::decode("{not json"),
            Err(FrameError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::decode_bytes(&[0xff, 0xfe]),
            Err(FrameError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_bytes_as_text() {
        let msg = ClientMessage::decode_bytes(br#"{"type":"create"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Create);
    }

    #[test]
    fn test_server_message_serialize() {
        let json = serde_json::to_string(&ServerMessage::Created {
            code: "482913".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"created","code":"482913"}"#);

        let json = serde_json::to_string(&ServerMessage::Start).unwrap();
        assert_eq!(json, r#"{"type":"start"}"#);
    }

    #[test]
    fn test_error_messages() {
        let msg: ServerMessage = AppError::InvalidOrFullCode.into();
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"error","msg":"Invalid or full code"}"#
        );

        let msg: ServerMessage = FrameError::UnknownType.into();
        assert_eq!(msg, ServerMessage::error("Unknown message type"));
    }
}
