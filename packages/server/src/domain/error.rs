//! Domain error types.

use thiserror::Error;

use super::value_object::ConnectionId;

/// A connection id is already present in the registry.
///
/// This is the only relay error surfaced to callers; the registry is left
/// unchanged when it is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Connection id '{0}' is already registered")]
pub struct DuplicateIdError(pub ConnectionId);

/// Delivery to a single connection failed.
///
/// Recovered locally by unregistering the connection; never reported to the
/// sender of the original message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryFailure {
    /// The receiving side of the connection is gone
    #[error("connection channel is closed")]
    ChannelClosed,

    /// The event could not be encoded for the wire
    #[error("failed to encode event: {0}")]
    Encode(String),
}

/// An inbound message that does not match any known variant.
///
/// Logged and dropped at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedMessage {
    #[error("unrecognized message kind '{0}'")]
    UnknownKind(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid message: {0}")]
    Invalid(String),
}

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Connection id must not be blank")]
    BlankConnectionId,

    #[error("Connection id is too long ({actual} > {max} characters)")]
    ConnectionIdTooLong { max: usize, actual: usize },
}
