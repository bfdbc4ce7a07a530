//! Gemeinsamer Server-Zustand fuer den Signaling-Relay
//!
//! Haelt Registry, Raumverwaltung und Metriken als Arc-geteilte Handles,
//! die sicher zwischen tokio-Tasks geteilt werden koennen.

use intercom_observability::{IntercomMetrics, RaumSnapshot, RelayStatusQuelle};
use std::sync::Arc;
use std::time::Instant;

use crate::registry::ConnectionRegistry;
use crate::rooms::RoomDirectory;

/// Konfiguration fuer den Signaling-Relay
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Anzeigename des Relays
    pub server_name: String,
    /// Maximale gleichzeitige Clients; weitere Upgrades werden abgelehnt
    pub max_clients: u32,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            server_name: "Intercom Relay".to_string(),
            max_clients: 512,
        }
    }
}

/// Gemeinsamer Relay-Zustand (thread-safe, Arc-geteilt)
///
/// Registry und RoomDirectory teilen per Clone ihren inneren Zustand;
/// dieser Struct buendelt die Handles fuer Handler und Tasks.
pub struct SignalingState {
    /// Relay-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Verbindungs-Registry (Identitaet -> Send-Queue)
    pub registry: ConnectionRegistry,
    /// Raum-Mitgliedschaften und Fan-out
    pub rooms: RoomDirectory,
    /// Prometheus-Metriken
    pub metriken: IntercomMetrics,
    /// Startzeitpunkt des Relays (fuer Uptime-Berechnung)
    pub start_time: Instant,
}

impl SignalingState {
    /// Erstellt einen neuen SignalingState
    pub fn neu(config: SignalingConfig, metriken: IntercomMetrics) -> Arc<Self> {
        let registry = ConnectionRegistry::neu(metriken.clone());
        let rooms = RoomDirectory::neu(registry.clone(), metriken.clone());
        Arc::new(Self {
            config: Arc::new(config),
            registry,
            rooms,
            metriken,
            start_time: Instant::now(),
        })
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl RelayStatusQuelle for SignalingState {
    fn verbundene_clients(&self) -> usize {
        self.registry.anzahl()
    }

    fn raum_snapshots(&self) -> Vec<RaumSnapshot> {
        self.rooms.snapshots()
    }

    fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
