//! Attached connections and their send handles.

use std::fmt;

use super::{
    error::DeliveryFailure,
    event::OutboundEvent,
    value_object::{ConnectionId, SessionId, Timestamp},
};

/// Send-capable handle of one connection.
///
/// Implementations must not block: the relay calls `deliver` while holding
/// its lock.
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionSink: Send + Sync {
    /// Hand an event to the connection
    fn deliver(&self, event: &OutboundEvent) -> Result<(), DeliveryFailure>;
}

/// Lifecycle of a connection as seen by the relay.
///
/// A connection is attaching until `RelayService::on_connect` returns; the
/// relay itself only reports the two states below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Registered and receiving broadcasts
    Established,
    /// Disconnected or pruned after a failed send (terminal)
    Closed,
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }
}

/// One attached client.
///
/// Being registered is what makes a connection live; there is no separate
/// liveness flag to keep in sync.
pub struct Connection {
    id: ConnectionId,
    session: SessionId,
    connected_at: Timestamp,
    sink: Box<dyn ConnectionSink>,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        connected_at: Timestamp,
        sink: impl ConnectionSink + 'static,
    ) -> Self {
        Self {
            id,
            session: SessionId::generate(),
            connected_at,
            sink: Box::new(sink),
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    /// Attachment this connection belongs to, fresh for every `new`
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    /// Deliver an event through this connection's sink
    pub fn send(&self, event: &OutboundEvent) -> Result<(), DeliveryFailure> {
        self.sink.deliver(event)
    }

    pub fn summary(&self) -> ConnectionSummary {
        ConnectionSummary {
            id: self.id.clone(),
            connected_at: self.connected_at,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("session", &self.session)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a registered connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSummary {
    pub id: ConnectionId,
    pub connected_at: Timestamp,
}
