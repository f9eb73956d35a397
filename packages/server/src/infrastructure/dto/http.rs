//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::ContentMessageDto;

/// Response of `GET /api/history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDto {
    /// Maximum number of messages the relay keeps
    pub capacity: usize,
    /// Current history, oldest first
    pub messages: Vec<ContentMessageDto>,
}

/// One entry of `GET /api/connections`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDetailDto {
    pub id: String,
    /// RFC 3339 (UTC)
    pub connected_at: String,
}
