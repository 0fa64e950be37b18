//! WebSocket Message Types
//!
//! Outbound frames are serialized [`Message`](crate::domain::Message)s.
//! Inbound frames are decoded here.

use serde::Deserialize;

/// A decoded client request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Chat text to publish to the room
    Chat { content: String },
    /// Ask for the list of online users
    ListUsers,
}

/// Shapes accepted on the wire, tried in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Inbound {
    Command(ClientCommand),
    /// Older clients send `{"content": "...", "sent_at": ...}`
    Legacy { content: String },
    /// A bare JSON string
    Text(String),
}

/// Inbound decode failure
#[derive(Debug, thiserror::Error)]
#[error("unsupported client payload: {0}")]
pub struct UnsupportedPayload(String);

/// Decode a text frame. Anything that is not JSON is treated as chat text.
pub fn parse_client_frame(text: &str) -> Result<ClientCommand, UnsupportedPayload> {
    let value = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => value,
        Err(_) => {
            return Ok(ClientCommand::Chat {
                content: text.to_string(),
            })
        }
    };

    match serde_json::from_value::<Inbound>(value) {
        Ok(Inbound::Command(command)) => Ok(command),
        Ok(Inbound::Legacy { content }) | Ok(Inbound::Text(content)) => {
            Ok(ClientCommand::Chat { content })
        }
        Err(e) => Err(UnsupportedPayload(e.to_string())),
    }
}
