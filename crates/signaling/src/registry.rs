//! Connection Registry – Identitaet -> Send-Queue, Zustell-Primitiv
//!
//! Die Registry verwaltet die Send-Queues aller verbundenen Clients und
//! stellt die eine Zustell-Operation bereit, auf der alles andere aufbaut.
//! Zustellung ist best-effort: ein unbekanntes Ziel, eine volle oder eine
//! geschlossene Queue ist ein protokollierter Zustellfehler, nie ein Fehler
//! fuer den Aufrufer – ein mitten im Fan-out entdeckter getrennter Peer darf
//! den Fan-out an die uebrigen Peers nicht abbrechen.
//!
//! Von Raeumen weiss die Registry nichts.

use dashmap::DashMap;
use intercom_core::ClientId;
use intercom_observability::IntercomMetrics;
use intercom_protocol::Envelope;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Groesse der Send-Queue pro Client
///
/// Laeuft die Queue eines langsamen Peers voll, werden weitere Envelopes an
/// ihn verworfen und als Zustellfehler gezaehlt.
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue eines verbundenen Clients
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub client_id: ClientId,
    pub tx: mpsc::Sender<Envelope>,
}

impl ClientSender {
    /// Sendet einen Envelope nicht-blockierend an den Client
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, envelope: Envelope) -> bool {
        match self.tx.try_send(envelope) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(client_id = %self.client_id, "Send-Queue voll – Envelope verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(client_id = %self.client_id, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionRegistry
// ---------------------------------------------------------------------------

/// Zentrale Verbindungs-Registry
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    /// Send-Queues, indiziert nach ClientId
    clients: DashMap<ClientId, ClientSender>,
    metriken: IntercomMetrics,
}

impl ConnectionRegistry {
    /// Erstellt eine neue ConnectionRegistry
    pub fn neu(metriken: IntercomMetrics) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                clients: DashMap::new(),
                metriken,
            }),
        }
    }

    /// Registriert eine neue Verbindung
    ///
    /// Erzeugt eine frische, prozessweit eindeutige Identitaet und gibt sie
    /// zusammen mit der Empfangs-Queue zurueck. Die `ClientConnection` liest
    /// aus dieser Queue und sendet via WebSocket. Schlaegt nie fehl.
    pub fn registrieren(&self) -> (ClientId, mpsc::Receiver<Envelope>) {
        let client_id = ClientId::new();
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        self.inner
            .clients
            .insert(client_id, ClientSender { client_id, tx });
        self.inner
            .metriken
            .connected_clients
            .set(self.inner.clients.len() as f64);

        tracing::debug!(client_id = %client_id, "Verbindung registriert");
        (client_id, rx)
    }

    /// Stellt einen Envelope best-effort an einen Client zu
    ///
    /// Gibt `true` zurueck wenn der Client bekannt war und der Envelope
    /// eingereiht wurde.
    pub fn senden(&self, client_id: &ClientId, envelope: Envelope) -> bool {
        let eingereiht = match self.inner.clients.get(client_id) {
            Some(sender) => sender.senden(envelope),
            None => {
                tracing::debug!(client_id = %client_id, "Zustellung an unbekannten Client");
                false
            }
        };
        if !eingereiht {
            self.inner.metriken.delivery_failures_total.inc();
        }
        eingereiht
    }

    /// Entfernt eine Verbindung; idempotent
    pub fn entfernen(&self, client_id: &ClientId) {
        if self.inner.clients.remove(client_id).is_some() {
            tracing::debug!(client_id = %client_id, "Verbindung entfernt");
        }
        self.inner
            .metriken
            .connected_clients
            .set(self.inner.clients.len() as f64);
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, client_id: &ClientId) -> bool {
        self.inner.clients.contains_key(client_id)
    }

    /// Gibt die Anzahl registrierter Verbindungen zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.clients.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
