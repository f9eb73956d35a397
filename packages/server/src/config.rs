//! Server configuration.

use thiserror::Error;

use crate::domain::DEFAULT_HISTORY_CAPACITY;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
/// Upper bound for the history capacity, the buffer is preallocated
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Host must not be empty")]
    EmptyHost,

    #[error("History capacity must be between 1 and {max} (got {actual})")]
    HistoryCapacityOutOfRange { max: usize, actual: usize },
}

/// Validated server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub history_capacity: usize,
}

impl ServerConfig {
    /// Create a new configuration with validation
    ///
    /// # Errors
    ///
    /// Returns an error if the host is blank or the history capacity is zero
    /// or above [`MAX_HISTORY_CAPACITY`].
    pub fn new(host: String, port: u16, history_capacity: usize) -> Result<Self, ConfigError> {
        if host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if history_capacity == 0 || history_capacity > MAX_HISTORY_CAPACITY {
            return Err(ConfigError::HistoryCapacityOutOfRange {
                max: MAX_HISTORY_CAPACITY,
                actual: history_capacity,
            });
        }
        Ok(Self {
            host,
            port,
            history_capacity,
        })
    }

    /// Address to bind, e.g. `127.0.0.1:8080`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
