//! Value objects used by the relay.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Identity of one attached connection.
///
/// Either the name a client asked for or a generated UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Maximum length of a connection id, in characters
    pub const MAX_LEN: usize = 64;

    /// Create a new ConnectionId with validation
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank or longer than [`Self::MAX_LEN`].
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::BlankConnectionId);
        }
        let len = value.chars().count();
        if len > Self::MAX_LEN {
            return Err(ValueObjectError::ConnectionIdTooLong {
                max: Self::MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(value))
    }

    /// Generate a fresh random id for an anonymous connection
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One attachment of a connection id.
///
/// A name can be reused after its connection closes; the session tells the
/// old attachment apart from the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Text payload of a content message.
///
/// Content is not validated here; blank text is stored as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageText {
    fn from(value: String) -> Self {
        Self(value)
    }
}
