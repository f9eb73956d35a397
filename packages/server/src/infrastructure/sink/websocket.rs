//! WebSocket を使った ConnectionSink 実装
//!
//! ## 責務
//!
//! - イベントを JSON テキストフレームにエンコード
//! - 接続ごとの `UnboundedSender` にフレームを渡す
//!
//! ## 設計ノート
//!
//! WebSocket の生成と書き込みは UI 層（`ui/handler/websocket.rs`）の送信タスクが
//! 行います。この実装はチャンネルに渡すだけなので、リレーのロック中に
//! ブロックしません。受信側（送信タスク）が終了していれば `ChannelClosed` を返します。

use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionSink, DeliveryFailure, OutboundEvent},
    infrastructure::dto::websocket::encode_outbound,
};

/// 送信タスクへ JSON フレームを渡すチャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// WebSocket 接続への送信ハンドル
///
/// チャンネルは無制限のため、読み取りを止めたピアのキューは際限なく増えます。
#[derive(Debug, Clone)]
pub struct WebSocketSink {
    sender: PusherChannel,
}

impl WebSocketSink {
    pub fn new(sender: PusherChannel) -> Self {
        Self { sender }
    }
}

impl ConnectionSink for WebSocketSink {
    fn deliver(&self, event: &OutboundEvent) -> Result<(), DeliveryFailure> {
        let frame = encode_outbound(event).map_err(|e| DeliveryFailure::Encode(e.to_string()))?;
        self.sender
            .send(frame)
            .map_err(|_| DeliveryFailure::ChannelClosed)
    }
}
