//! Conversion logic between DTOs and domain types.

use crate::domain::{
    ConnectionId, ConnectionSummary, ContentMessage, MessageText, OutboundEvent, RelayMessage,
    Timestamp,
};
use crate::infrastructure::dto::{http, websocket as dto};
use kairo_shared::time::timestamp_to_rfc3339;

// ========================================
// DTO → Domain
// ========================================

impl dto::InboundMessage {
    /// Convert into a domain message attributed to `from`.
    ///
    /// Returns `None` for [`dto::InboundMessage::Unknown`].
    pub fn into_domain(self, from: &ConnectionId) -> Option<RelayMessage> {
        match self {
            dto::InboundMessage::ContentMessage { text, timestamp } => {
                Some(RelayMessage::Content(ContentMessage::new(
                    MessageText::from(text),
                    Timestamp::new(timestamp),
                    Some(from.clone()),
                )))
            }
            dto::InboundMessage::HistoryRequest => Some(RelayMessage::HistoryRequest {
                requester: from.clone(),
            }),
            dto::InboundMessage::Handshake { name } => {
                if let Some(name) = name {
                    tracing::debug!(connection_id = %from, name = %name, "Handshake carries a name");
                }
                Some(RelayMessage::Handshake {
                    from: Some(from.clone()),
                })
            }
            dto::InboundMessage::Unknown => None,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&ContentMessage> for dto::ContentMessageDto {
    fn from(message: &ContentMessage) -> Self {
        Self {
            kind: dto::MessageKind::ContentMessage,
            text: message.text().as_str().to_string(),
            timestamp: message.timestamp().value(),
            sender: message.sender().map(|id| id.as_str().to_string()),
        }
    }
}

impl From<&OutboundEvent> for dto::OutboundMessage {
    fn from(event: &OutboundEvent) -> Self {
        match event {
            OutboundEvent::HistorySnapshot(history) => {
                dto::OutboundMessage::HistorySnapshot(dto::HistorySnapshotMessage {
                    kind: dto::MessageKind::HistorySnapshot,
                    history: history.iter().map(dto::ContentMessageDto::from).collect(),
                })
            }
            OutboundEvent::Content(message) => {
                dto::OutboundMessage::Content(dto::ContentMessageDto::from(message))
            }
        }
    }
}

impl From<ConnectionSummary> for http::ConnectionDetailDto {
    fn from(summary: ConnectionSummary) -> Self {
        Self {
            id: summary.id.into_string(),
            connected_at: timestamp_to_rfc3339(summary.connected_at.value()),
        }
    }
}
