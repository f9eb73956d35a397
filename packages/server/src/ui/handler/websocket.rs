//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, SessionId},
    infrastructure::{dto::websocket::parse_inbound, sink::WebSocketSink},
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Connection id; a random one is assigned when omitted
    pub name: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let connection_id = match query.name {
        Some(name) => ConnectionId::new(name).map_err(|e| {
            tracing::warn!("Rejected connection: {}", e);
            StatusCode::BAD_REQUEST
        })?,
        None => ConnectionId::generate(),
    };

    // Channel drained by this connection's pusher task
    let (tx, rx) = mpsc::unbounded_channel();

    // The history snapshot is queued here, ahead of any broadcast
    let result = state
        .relay
        .lock()
        .await
        .on_connect(connection_id.clone(), WebSocketSink::new(tx));

    match result {
        Ok(outcome) if !outcome.state.is_terminal() => {
            let session = outcome.session;
            let failed_state = state.clone();
            let failed_id = connection_id.clone();
            Ok(ws
                .on_failed_upgrade(move |e| {
                    tracing::warn!(connection_id = %failed_id, "WebSocket upgrade failed: {}", e);
                    tokio::spawn(async move {
                        failed_state
                            .relay
                            .lock()
                            .await
                            .on_disconnect(&failed_id, session);
                    });
                })
                .on_upgrade(move |socket| handle_socket(socket, state, connection_id, session, rx)))
        }
        Ok(outcome) => {
            tracing::warn!(
                connection_id = %connection_id,
                "Connection ended in {:?} before upgrade",
                outcome.state
            );
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(e) => {
            tracing::warn!("Rejected connection: {}", e);
            Err(StatusCode::CONFLICT)
        }
    }
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// The task ends when the relay drops this connection's sink or the socket
/// stops accepting writes.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    session: SessionId,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();

    let mut send_task = pusher_loop(rx, sender);

    // Spawn a task to feed frames from this client into the relay
    let state_clone = state.clone();
    let id_clone = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    let message = match parse_inbound(text.as_str(), &id_clone) {
                        Ok(message) => message,
                        Err(e) => {
                            tracing::warn!(
                                connection_id = %id_clone,
                                "Dropping malformed message: {}",
                                e
                            );
                            continue;
                        }
                    };
                    let outcome = state_clone.relay.lock().await.on_message(message);
                    tracing::debug!(connection_id = %id_clone, ?outcome, "Message handled");
                }
                Message::Binary(_) => {
                    tracing::warn!(connection_id = %id_clone, "Ignoring binary frame");
                }
                Message::Close(_) => {
                    tracing::info!(connection_id = %id_clone, "Client requested close");
                    break;
                }
                // Ping/pong is handled by the WebSocket protocol
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .relay
        .lock()
        .await
        .on_disconnect(&connection_id, session);
}
