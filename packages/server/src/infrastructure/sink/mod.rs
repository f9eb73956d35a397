//! ConnectionSink の実装
//!
//! - `websocket`: WebSocket の送信タスクへチャンネル経由で渡す実装

pub mod websocket;

pub use websocket::{PusherChannel, WebSocketSink};
