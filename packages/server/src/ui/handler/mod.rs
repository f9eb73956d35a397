//! Request handlers.

mod http;
mod websocket;

pub use http::{get_connections, get_history, health_check};
pub use websocket::websocket_handler;
