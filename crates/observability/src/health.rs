//! Health-Check und Status-Snapshot fuer den Intercom-Relay
//!
//! Endpunkte:
//! - `GET /health` – Prozessstatus plus Client-/Raum-Zaehler
//! - `GET /status` – Mitglieder-Snapshot pro Raum plus Uptime
//!
//! Beide sind lesende Sichten auf den In-Memory-Zustand des Relays. Die
//! Kopplung laeuft ueber das `RelayStatusQuelle`-Trait, damit dieses Crate
//! den Signaling-Zustand nicht kennen muss.

use axum::{extract::State, routing::get, Json, Router};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lesende Sicht auf den Relay-Zustand
pub trait RelayStatusQuelle: Send + Sync + 'static {
    /// Anzahl aktuell verbundener Clients
    fn verbundene_clients(&self) -> usize;

    /// Snapshot aller aktiven Raeume mit ihren Mitgliedern
    fn raum_snapshots(&self) -> Vec<RaumSnapshot>;

    /// Sekunden seit Prozessstart
    fn uptime_sek(&self) -> u64;
}

/// Mitglieder-Snapshot eines einzelnen Raums
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaumSnapshot {
    pub room_id: String,
    pub member_count: usize,
    pub members: Vec<String>,
}

/// Antwort des `/health`-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub connected_clients: usize,
    pub active_rooms: usize,
    /// ISO-8601-Zeitstempel des Abrufs
    pub timestamp: String,
}

/// Antwort des `/status`-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub connected_clients: usize,
    pub active_rooms: Vec<RaumSnapshot>,
    pub uptime_secs: u64,
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(quelle: Arc<dyn RelayStatusQuelle>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(quelle)
}

/// Axum-Router fuer den `/status`-Endpunkt
pub fn status_router(quelle: Arc<dyn RelayStatusQuelle>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .with_state(quelle)
}

/// `GET /health` – Prozessstatus und Zaehler
async fn health_handler(
    State(quelle): State<Arc<dyn RelayStatusQuelle>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        connected_clients: quelle.verbundene_clients(),
        active_rooms: quelle.raum_snapshots().len(),
        timestamp: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// `GET /status` – Mitglieder-Snapshot pro Raum
async fn status_handler(
    State(quelle): State<Arc<dyn RelayStatusQuelle>>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        connected_clients: quelle.verbundene_clients(),
        active_rooms: quelle.raum_snapshots(),
        uptime_secs: quelle.uptime_sek(),
    })
}
