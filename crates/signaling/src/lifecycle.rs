//! Lifecycle-Supervisor – Verbindungsaufbau und -abbau
//!
//! Wird von der Transportschicht bei Connect- und Disconnect-Ereignissen
//! aufgerufen. Eine Identitaet durchlaeuft genau einmal
//! `Connecting -> Open -> Closed`; `Open` beginnt mit
//! `verbindung_aufbauen`, danach gibt es keinen Wiedereintritt.

use intercom_core::ClientId;
use intercom_protocol::Envelope;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::server_state::SignalingState;

/// Orchestriert Setup und Teardown einer Verbindung
pub struct LifecycleSupervisor {
    state: Arc<SignalingState>,
}

impl LifecycleSupervisor {
    /// Erstellt einen neuen LifecycleSupervisor
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self { state }
    }

    /// Verbindungsaufbau: Identitaet vergeben und Begruessung einreihen
    ///
    /// Der `connection`-Envelope ist die einzige Nachricht die ein Client
    /// vor seinem ersten Raum-Beitritt bekommt; sein Empfang gilt
    /// clientseitig als abgeschlossener Handshake.
    pub fn verbindung_aufbauen(&self) -> (ClientId, mpsc::Receiver<Envelope>) {
        let (client_id, sende_rx) = self.state.registry.registrieren();
        self.state
            .registry
            .senden(&client_id, Envelope::connection(client_id));

        tracing::info!(client_id = %client_id, "Client verbunden");
        (client_id, sende_rx)
    }

    /// Verbindungsabbau: aus allen Raeumen entfernen, dann Registry-Eintrag
    ///
    /// Die Reihenfolge ist Pflicht: das Raum-Aufraeumen stellt seine
    /// Benachrichtigungen zu solange der scheidende Eintrag noch abfragbar
    /// ist. Transportfehler und sauberer Close laufen identisch hier durch.
    pub fn verbindung_abbauen(&self, client_id: &ClientId) {
        self.state.rooms.alle_verlassen(client_id);
        self.state.registry.entfernen(client_id);

        tracing::info!(client_id = %client_id, "Client getrennt");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
