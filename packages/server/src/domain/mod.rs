//! Domain layer: value objects, the history buffer, the connection registry
//! and the broadcast dispatcher.
//!
//! Nothing in this layer knows about WebSocket or JSON. Delivery is expressed
//! through the [`ConnectionSink`] trait, implemented by the infrastructure layer.

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod history;
pub mod registry;
pub mod value_object;

pub use connection::{Connection, ConnectionSink, ConnectionState, ConnectionSummary};
pub use dispatcher::{BroadcastDispatcher, DeliveryFailureHook, TracingFailureHook};
pub use error::{DeliveryFailure, DuplicateIdError, MalformedMessage, ValueObjectError};
pub use event::{ContentMessage, MessageKind, OutboundEvent, RelayMessage};
pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryBuffer};
pub use registry::{ConnectionRegistry, Visit};
pub use value_object::{ConnectionId, MessageText, SessionId, Timestamp};
