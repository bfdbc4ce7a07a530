//! Fehlertypen fuer den Signaling-Relay

use thiserror::Error;

/// Fehlertyp fuer den Signaling-Relay
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Eingehender Frame war kein gueltiger Envelope
    #[error("Dekodierfehler: {0}")]
    Dekodierung(#[from] serde_json::Error),

    /// Envelope war dekodierbar, verletzt aber das Protokoll
    /// (z.B. Relay-Nachricht ohne target)
    #[error("Protokollfehler: {0}")]
    Protokoll(String),
}

impl SignalingError {
    /// Erstellt einen Protokollfehler
    pub fn protokoll(msg: impl Into<String>) -> Self {
        Self::Protokoll(msg.into())
    }
}

/// Result-Typ fuer den Signaling-Relay
pub type SignalingResult<T> = Result<T, SignalingError>;
