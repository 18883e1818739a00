//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MessageRejected;
use crate::types::Millis;

/// Client → Server message
///
/// Missing, `null` or non-string payload fields read as empty strings.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Announce a display name
    Start {
        #[serde(default, deserialize_with = "lenient_string")]
        username: String,
    },
    /// Send a chat message to everyone
    Message {
        #[serde(default, deserialize_with = "lenient_string")]
        text: String,
    },
}

/// Accept any JSON value, keeping it only if it is a string
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// A chat message as broadcast to every connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub username: String,
    pub text: String,
    pub sent_at: Millis,
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Number of named connections online
    OnlineCount { count: usize },
    /// Join/leave notice
    System { text: String, sent_at: Millis },
    /// Chat message
    Message(OutboundMessage),
    /// Rejection sent only to the originating connection
    Warning { text: String },
}

impl ServerMessage {
    pub fn system(text: impl Into<String>, sent_at: Millis) -> Self {
        ServerMessage::System {
            text: text.into(),
            sent_at,
        }
    }
}

/// Convert a rejection to the warning shown to the sender
impl From<MessageRejected> for ServerMessage {
    fn from(err: MessageRejected) -> Self {
        ServerMessage::Warning {
            text: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RateLimitError;

    #[test]
    fn test_client_message_deserialize() {
        let json = r#"{"type": "start", "username": "Alice"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Start {
                username: "Alice".to_string()
            }
        );

        let json = r#"{"type": "message", "text": "hi"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, ClientMessage::Message { text: "hi".to_string() });
    }

    #[test]
    fn test_missing_or_malformed_fields_are_empty() {
        let cases = [
            r#"{"type": "start"}"#,
            r#"{"type": "start", "username": null}"#,
            r#"{"type": "start", "username": 42}"#,
            r#"{"type": "start", "username": {"nested": true}}"#,
        ];
        for json in cases {
            let msg: ClientMessage = serde_json::from_str(json).unwrap();
            assert_eq!(msg, ClientMessage::Start { username: String::new() }, "{json}");
        }

        let msg: ClientMessage = serde_json::from_str(r#"{"type": "message"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Message { text: String::new() });
    }

    #[test]
    fn test_unknown_type_is_error() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type": "rename"}"#).is_err());
    }

    #[test]
    fn test_server_message_serialize() {
        let msg = ServerMessage::Message(OutboundMessage {
            username: "Alice".to_string(),
            text: "hello".to_string(),
            sent_at: 42,
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"message\""));
        assert!(json.contains("\"username\":\"Alice\""));
        assert!(json.contains("\"sent_at\":42"));

        let json = serde_json::to_string(&ServerMessage::OnlineCount { count: 3 }).unwrap();
        assert_eq!(json, r#"{"type":"online_count","count":3}"#);
    }

    #[test]
    fn test_rejection_to_warning() {
        let msg: ServerMessage = MessageRejected::from(RateLimitError::WindowExceeded).into();
        assert_eq!(
            msg,
            ServerMessage::Warning {
                text: "You are sending messages too quickly.".to_string()
            }
        );
    }
}
