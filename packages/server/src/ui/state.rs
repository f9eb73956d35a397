//! Server state shared by every handler.

use tokio::sync::Mutex;

use crate::usecase::RelayService;

/// Shared application state
///
/// The relay core is not thread-safe, so every handler takes this lock for
/// the duration of a single relay operation.
pub struct AppState {
    /// RelayService（履歴・接続・配信の窓口）
    pub relay: Mutex<RelayService>,
}

impl AppState {
    pub fn new(relay: RelayService) -> Self {
        Self {
            relay: Mutex::new(relay),
        }
    }
}
