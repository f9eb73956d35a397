//! WebSocket message DTOs.
//!
//! Every frame is a JSON object discriminated by its `kind` field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ConnectionId, MalformedMessage, OutboundEvent, RelayMessage};

/// Wire value of the `kind` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    ContentMessage,
    HistoryRequest,
    Handshake,
    HistorySnapshot,
}

/// Client → relay frame
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InboundMessage {
    ContentMessage {
        text: String,
        timestamp: i64,
    },
    HistoryRequest,
    Handshake {
        #[serde(default)]
        name: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// A content message as sent on the wire (broadcast and history entries)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMessageDto {
    pub kind: MessageKind,
    pub text: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

/// History snapshot sent once per new connection and on history requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshotMessage {
    pub kind: MessageKind,
    pub history: Vec<ContentMessageDto>,
}

/// Relay → client frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    HistorySnapshot(HistorySnapshotMessage),
    Content(ContentMessageDto),
}

/// Parse a text frame received from `from` into a domain message.
///
/// # Errors
///
/// Returns [`MalformedMessage`] for invalid JSON, a missing or non-string
/// `kind`, an unrecognized `kind`, or a payload missing required fields.
pub fn parse_inbound(raw: &str, from: &ConnectionId) -> Result<RelayMessage, MalformedMessage> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| MalformedMessage::Invalid(e.to_string()))?;

    let kind = match value.get("kind") {
        Some(Value::String(kind)) => kind.clone(),
        Some(_) => {
            return Err(MalformedMessage::Invalid(
                "field 'kind' must be a string".to_string(),
            ));
        }
        None => return Err(MalformedMessage::MissingField("kind")),
    };

    let message: InboundMessage =
        serde_json::from_value(value).map_err(|e| MalformedMessage::Invalid(e.to_string()))?;

    message
        .into_domain(from)
        .ok_or(MalformedMessage::UnknownKind(kind))
}

/// Encode an outbound event as a JSON text frame
pub fn encode_outbound(event: &OutboundEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundMessage::from(event))
}
