//! Message-Dispatcher – Dekodiert eingehende Frames und routet sie
//!
//! Der Dispatcher bekommt einen rohen Textframe samt Absender-Identitaet.
//! Dekodieren passiert genau einmal an dieser Grenze; danach ist jeder
//! Zweig ein Arm eines erschoepfenden Matches ueber das geschlossene
//! `Envelope`-Enum.
//!
//! ## Fire-and-forget
//! Ein nicht dekodierbarer Frame wird protokolliert und verworfen; die
//! Verbindung bleibt offen und der Absender bekommt keine Fehlermeldung.
//! Auch Zustellfehler (unbekanntes Ziel, getrennter Peer) bleiben fuer den
//! Absender unsichtbar – Peers muessen ihre eigene Ende-zu-Ende-Liveness
//! mitbringen.

use intercom_core::ClientId;
use intercom_protocol::{unix_zeit_ms, Envelope};
use std::sync::Arc;

use crate::error::{SignalingError, SignalingResult};
use crate::server_state::SignalingState;

/// Zentraler Message-Dispatcher
pub struct MessageDispatcher {
    state: Arc<SignalingState>,
}

impl MessageDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self { state }
    }

    /// Verarbeitet einen rohen Textframe des angegebenen Absenders
    pub fn dispatch(&self, quelle: ClientId, text: &str) {
        let envelope = match dekodieren(text) {
            Ok(envelope) => envelope,
            Err(fehler) => {
                tracing::warn!(client_id = %quelle, fehler = %fehler, "Frame verworfen");
                return;
            }
        };

        let kind = envelope.kind();
        self.state
            .metriken
            .messages_total
            .with_label_values(&[kind])
            .inc();
        tracing::debug!(client_id = %quelle, kind, "Envelope empfangen");

        match envelope {
            // ---------------------------------------------------------------
            // Raum-Nachrichten
            // ---------------------------------------------------------------
            Envelope::JoinRoom { room_id } => {
                self.state.rooms.beitreten(&room_id, quelle);
            }

            Envelope::LeaveRoom { room_id } => {
                self.state.rooms.verlassen(&room_id, &quelle);
            }

            // ---------------------------------------------------------------
            // Punkt-zu-Punkt-Relay: target nachschlagen, from stempeln.
            // Mitgliedschaft des Ziels im genannten Raum wird nicht geprueft;
            // das Vertrauen liegt bei den Peers.
            // ---------------------------------------------------------------
            Envelope::Offer {
                target,
                offer,
                room_id,
                ..
            } => {
                self.weiterleiten(
                    quelle,
                    target,
                    Envelope::Offer {
                        target: None,
                        from: Some(quelle),
                        offer,
                        room_id,
                        timestamp: Some(unix_zeit_ms()),
                    },
                );
            }

            Envelope::Answer {
                target,
                answer,
                room_id,
                ..
            } => {
                self.weiterleiten(
                    quelle,
                    target,
                    Envelope::Answer {
                        target: None,
                        from: Some(quelle),
                        answer,
                        room_id,
                        timestamp: Some(unix_zeit_ms()),
                    },
                );
            }

            Envelope::IceCandidate {
                target,
                candidate,
                room_id,
                ..
            } => {
                self.weiterleiten(
                    quelle,
                    target,
                    Envelope::IceCandidate {
                        target: None,
                        from: Some(quelle),
                        candidate,
                        room_id,
                        timestamp: Some(unix_zeit_ms()),
                    },
                );
            }

            // ---------------------------------------------------------------
            // Liveness-Probe: pong nur an den Absender, keine Seiteneffekte
            // ---------------------------------------------------------------
            Envelope::Ping => {
                self.state.registry.senden(&quelle, Envelope::pong());
            }

            // ---------------------------------------------------------------
            // Relay-erzeugte Arten, die nur vom Relay kommen duerfen
            // ---------------------------------------------------------------
            Envelope::Connection { .. }
            | Envelope::UserJoined { .. }
            | Envelope::UserLeft { .. }
            | Envelope::UserDisconnected { .. }
            | Envelope::RoomInfo { .. }
            | Envelope::Pong { .. } => {
                tracing::warn!(client_id = %quelle, kind, "Relay-Nachrichtenart vom Client – verworfen");
            }
        }
    }

    /// Leitet einen Relay-Envelope an sein Ziel weiter
    fn weiterleiten(&self, quelle: ClientId, target: Option<ClientId>, ausgehend: Envelope) {
        let Some(ziel) = target else {
            let fehler = SignalingError::protokoll(format!("{} ohne target", ausgehend.kind()));
            tracing::warn!(client_id = %quelle, fehler = %fehler, "Relay-Envelope verworfen");
            return;
        };

        if self.state.registry.senden(&ziel, ausgehend) {
            tracing::debug!(von = %quelle, nach = %ziel, "Envelope weitergeleitet");
        }
    }
}

/// Dekodiert einen Textframe in einen Envelope
fn dekodieren(text: &str) -> SignalingResult<Envelope> {
    Ok(serde_json::from_str(text)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
