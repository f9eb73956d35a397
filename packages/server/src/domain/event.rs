//! Messages flowing into and out of the relay.

use super::value_object::{ConnectionId, MessageText, Timestamp};

/// Discriminant of an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    ContentMessage,
    HistoryRequest,
    Handshake,
}

impl MessageKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::ContentMessage => "content-message",
            MessageKind::HistoryRequest => "history-request",
            MessageKind::Handshake => "handshake",
        }
    }
}

/// A chat message as stored in history and fanned out to connections.
///
/// Fields are private so a message cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMessage {
    text: MessageText,
    timestamp: Timestamp,
    sender: Option<ConnectionId>,
}

impl ContentMessage {
    pub fn new(text: MessageText, timestamp: Timestamp, sender: Option<ConnectionId>) -> Self {
        Self {
            text,
            timestamp,
            sender,
        }
    }

    pub fn text(&self) -> &MessageText {
        &self.text
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn sender(&self) -> Option<&ConnectionId> {
        self.sender.as_ref()
    }
}

/// An inbound message, one payload shape per kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    /// Appended to history and broadcast to every connection
    Content(ContentMessage),
    /// Answered with a history snapshot sent to `requester` only
    HistoryRequest { requester: ConnectionId },
    /// Connection-level greeting; carries no payload for the relay
    Handshake { from: Option<ConnectionId> },
}

impl RelayMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            RelayMessage::Content(_) => MessageKind::ContentMessage,
            RelayMessage::HistoryRequest { .. } => MessageKind::HistoryRequest,
            RelayMessage::Handshake { .. } => MessageKind::Handshake,
        }
    }
}

/// An event delivered to a connection through its sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Ordered copy of the history buffer, oldest first
    HistorySnapshot(Vec<ContentMessage>),
    /// A newly accepted content message
    Content(ContentMessage),
}
