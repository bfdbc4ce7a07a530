//! WebSocket-Endpunkt – Upgrade, Client-Limit, Task-Start
//!
//! Stellt die `/ws`-Route bereit. Fuer jede akzeptierte Verbindung wird
//! ein eigener tokio-Task mit einer `ClientConnection` gestartet.

use axum::{
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::connection::ClientConnection;
use crate::server_state::SignalingState;

/// Axum-Router fuer den Signaling-Endpunkt `/ws`
pub fn ws_router(state: Arc<SignalingState>) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}

/// `GET /ws` – WebSocket-Upgrade
///
/// Lehnt das Upgrade mit 503 ab wenn das Client-Limit erreicht ist.
async fn ws_handler(
    State(state): State<Arc<SignalingState>>,
    ws: WebSocketUpgrade,
) -> Response {
    let online = state.registry.anzahl() as u32;
    if online >= state.config.max_clients {
        tracing::warn!(
            online,
            max = state.config.max_clients,
            "Relay voll – Upgrade abgelehnt"
        );
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    ws.on_upgrade(move |socket| async move {
        ClientConnection::neu(state).verarbeiten(socket).await;
    })
}
