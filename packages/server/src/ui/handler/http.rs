//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::{
        http::{ConnectionDetailDto, HistoryDto},
        websocket::ContentMessageDto,
    },
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current history, oldest first
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<HistoryDto> {
    let relay = state.relay.lock().await;

    // Domain Model から DTO への変換
    let history = HistoryDto {
        capacity: relay.history_capacity(),
        messages: relay
            .history_snapshot()
            .iter()
            .map(ContentMessageDto::from)
            .collect(),
    };

    Json(history)
}

/// Attached connections in registration order
pub async fn get_connections(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ConnectionDetailDto>> {
    let connections = state.relay.lock().await.connections();

    Json(
        connections
            .into_iter()
            .map(ConnectionDetailDto::from)
            .collect(),
    )
}
