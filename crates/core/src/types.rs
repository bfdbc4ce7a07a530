//! Identitaetstypen fuer den Signaling-Relay
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Verbindungs-Identitaet eines Clients
///
/// Wird beim Verbindungsaufbau erzeugt und fuer die Prozesslebensdauer
/// genau einmal vergeben. 122 Zufallsbits (UUID v4) machen Kollisionen
/// praktisch unmoeglich.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Erstellt eine neue zufaellige ClientId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client:{}", self.0)
    }
}

/// Vom Client vergebene Raum-ID
///
/// Fuer den Relay ein opaker String; es wird kein Format erzwungen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub String);

impl RoomId {
    /// Erstellt eine RoomId aus einem beliebigen String
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Gibt die ID als &str zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "room:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_eindeutig() {
        let a = ClientId::new();
        let b = ClientId::new();
        assert_ne!(a, b, "Zwei neue ClientIds muessen verschieden sein");
    }

    #[test]
    fn client_id_serialisiert_als_nackte_uuid() {
        let id = ClientId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn client_id_display_mit_prefix() {
        let id = ClientId(Uuid::nil());
        assert!(id.to_string().starts_with("client:"));
    }

    #[test]
    fn room_id_ist_opak() {
        // Beliebige Strings sind gueltig, auch solche mit Sonderzeichen
        let raum = RoomId::new("calls/7 teilnehmer");
        assert_eq!(raum.as_str(), "calls/7 teilnehmer");

        let json = serde_json::to_string(&raum).unwrap();
        let zurueck: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(raum, zurueck);
    }
}
