//! Client-Connection – Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Ein Schreib-Task leert die Registry-Queue in den
//! WebSocket-Sink; die Lese-Schleife dispatcht jeden Textframe synchron.
//! Dadurch laufen Frames verschiedener Verbindungen parallel, die Frames
//! einer Verbindung aber strikt nacheinander.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::dispatcher::MessageDispatcher;
use crate::lifecycle::LifecycleSupervisor;
use crate::server_state::SignalingState;

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct ClientConnection {
    state: Arc<SignalingState>,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self { state }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis der Client die Verbindung schliesst oder ein
    /// Transportfehler auftritt; beides loest denselben Teardown aus.
    pub async fn verarbeiten(self, socket: WebSocket) {
        let supervisor = LifecycleSupervisor::neu(Arc::clone(&self.state));
        let dispatcher = MessageDispatcher::neu(Arc::clone(&self.state));

        let (client_id, mut sende_rx) = supervisor.verbindung_aufbauen();
        let (mut sink, mut stream) = socket.split();

        // Schreib-Task: Registry-Queue -> WebSocket-Sink
        let schreiber = tokio::spawn(async move {
            while let Some(envelope) = sende_rx.recv().await {
                let text = match serde_json::to_string(&envelope) {
                    Ok(text) => text,
                    Err(fehler) => {
                        tracing::error!(fehler = %fehler, "Envelope nicht serialisierbar");
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        });

        // Lese-Schleife: ein Frame nach dem anderen
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => dispatcher.dispatch(client_id, &text),
                Ok(Message::Binary(_)) => {
                    tracing::debug!(client_id = %client_id, "Binaerframe verworfen");
                }
                // Beantwortet die WebSocket-Schicht selbst
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::debug!(client_id = %client_id, "Close-Frame empfangen");
                    break;
                }
                Err(fehler) => {
                    tracing::debug!(client_id = %client_id, fehler = %fehler, "WebSocket-Fehler");
                    break;
                }
            }
        }

        // Teardown: erst Raeume (Benachrichtigungen), dann Registry.
        // Danach ist die Queue geschlossen und der Schreib-Task endet von
        // selbst; abort deckt den Fall eines blockierten Sinks ab.
        supervisor.verbindung_abbauen(&client_id);
        schreiber.abort();

        tracing::debug!(client_id = %client_id, "Verbindungs-Task beendet");
    }
}
