//! Envelope – Die Nachrichteneinheit des Signaling-Protokolls
//!
//! Jeder Textframe auf der WebSocket-Verbindung ist genau ein JSON-Objekt
//! mit einem `type`-Tag. Die Varianten sind als geschlossenes Tagged Enum
//! modelliert: eine neue Nachrichtenart ist damit eine zur Compilezeit
//! geprueften Aenderung, kein String-Vergleich zur Laufzeit.
//!
//! ## Design
//! - Tag-Namen in kebab-case (`join-room`), Feldnamen in camelCase
//!   (`roomId`) – das ist das Format der mobilen Clients.
//! - Relay-erzeugte Nachrichten tragen einen `timestamp` (Unix-Millis).
//! - `offer`/`answer`/`candidate`-Nutzlasten sind opake JSON-Werte; der
//!   Relay interpretiert sie nicht.
//! - Relay-Richtung bei den Punkt-zu-Punkt-Arten: eingehend traegt der
//!   Envelope `target`, ausgehend stattdessen `from`. Beide Felder sind
//!   deshalb optional und werden bei `None` nicht serialisiert.

use intercom_core::{ClientId, RoomId};
use serde::{Deserialize, Serialize};

/// Gibt die aktuelle Unix-Zeit in Millisekunden zurueck
pub fn unix_zeit_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// Alle Nachrichtenarten zwischen Client und Relay (typsicher via Tagged Enum)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Envelope {
    /// Zugewiesene Identitaet, einmalig nach dem Verbindungsaufbau (Relay -> Client)
    Connection { client_id: ClientId, timestamp: u64 },

    /// Raum beitreten bzw. erzeugen (Client -> Relay)
    JoinRoom { room_id: RoomId },

    /// Raum verlassen (Client -> Relay)
    LeaveRoom { room_id: RoomId },

    /// Ein Mitglied ist beigetreten (Relay -> uebrige Mitglieder)
    UserJoined {
        client_id: ClientId,
        room_id: RoomId,
        timestamp: u64,
    },

    /// Ein Mitglied hat den Raum explizit verlassen (Relay -> uebrige Mitglieder)
    UserLeft {
        client_id: ClientId,
        room_id: RoomId,
        timestamp: u64,
    },

    /// Ein Mitglied hat die Verbindung verloren (Relay -> uebrige Mitglieder)
    UserDisconnected {
        client_id: ClientId,
        room_id: RoomId,
        timestamp: u64,
    },

    /// Mitgliederliste fuer den Beitretenden, ohne ihn selbst (Relay -> Beitretender)
    RoomInfo {
        room_id: RoomId,
        members: Vec<ClientId>,
        timestamp: u64,
    },

    /// SDP-Offer, unveraendert weitergereicht
    Offer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ClientId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ClientId>,
        offer: serde_json::Value,
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<u64>,
    },

    /// SDP-Answer, unveraendert weitergereicht
    Answer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ClientId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ClientId>,
        answer: serde_json::Value,
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<u64>,
    },

    /// ICE-Kandidat, unveraendert weitergereicht
    IceCandidate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ClientId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ClientId>,
        candidate: serde_json::Value,
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<u64>,
    },

    /// Liveness-Probe des Clients
    Ping,

    /// Antwort auf einen Ping (Relay -> Client)
    Pong { timestamp: u64 },
}

impl Envelope {
    /// Erstellt den Begruessungs-Envelope mit der zugewiesenen Identitaet
    pub fn connection(client_id: ClientId) -> Self {
        Self::Connection {
            client_id,
            timestamp: unix_zeit_ms(),
        }
    }

    /// Erstellt eine `user-joined`-Benachrichtigung
    pub fn user_joined(client_id: ClientId, room_id: RoomId) -> Self {
        Self::UserJoined {
            client_id,
            room_id,
            timestamp: unix_zeit_ms(),
        }
    }

    /// Erstellt eine `user-left`-Benachrichtigung
    pub fn user_left(client_id: ClientId, room_id: RoomId) -> Self {
        Self::UserLeft {
            client_id,
            room_id,
            timestamp: unix_zeit_ms(),
        }
    }

    /// Erstellt eine `user-disconnected`-Benachrichtigung
    pub fn user_disconnected(client_id: ClientId, room_id: RoomId) -> Self {
        Self::UserDisconnected {
            client_id,
            room_id,
            timestamp: unix_zeit_ms(),
        }
    }

    /// Erstellt die Mitgliederliste fuer einen Beitretenden
    pub fn room_info(room_id: RoomId, members: Vec<ClientId>) -> Self {
        Self::RoomInfo {
            room_id,
            members,
            timestamp: unix_zeit_ms(),
        }
    }

    /// Erstellt eine Pong-Antwort
    pub fn pong() -> Self {
        Self::Pong {
            timestamp: unix_zeit_ms(),
        }
    }

    /// Gibt den Wire-Tag der Nachrichtenart zurueck (fuer Logs und Metriken)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::JoinRoom { .. } => "join-room",
            Self::LeaveRoom { .. } => "leave-room",
            Self::UserJoined { .. } => "user-joined",
            Self::UserLeft { .. } => "user-left",
            Self::UserDisconnected { .. } => "user-disconnected",
            Self::RoomInfo { .. } => "room-info",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice-candidate",
            Self::Ping => "ping",
            Self::Pong { .. } => "pong",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_id() -> ClientId {
        ClientId(Uuid::nil())
    }

    #[test]
    fn join_room_wird_aus_client_json_geparst() {
        let json = r#"{"type":"join-room","roomId":"daily-standup"}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(
            env,
            Envelope::JoinRoom {
                room_id: RoomId::new("daily-standup")
            }
        );
    }

    #[test]
    fn connection_serialisiert_mit_camel_case_feldern() {
        let json = serde_json::to_string(&Envelope::connection(test_id())).unwrap();
        assert!(json.contains("\"type\":\"connection\""));
        assert!(json.contains("\"clientId\":\"00000000-0000-0000-0000-000000000000\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn offer_eingehend_traegt_target_aber_kein_from() {
        let json = r#"{
            "type": "offer",
            "target": "00000000-0000-0000-0000-000000000000",
            "offer": {"sdp": "v=0...", "type": "offer"},
            "roomId": "call-1"
        }"#;
        let env: Envelope = serde_json::from_str(json).unwrap();
        match env {
            Envelope::Offer {
                target,
                from,
                offer,
                room_id,
                timestamp,
            } => {
                assert_eq!(target, Some(test_id()));
                assert_eq!(from, None);
                assert_eq!(timestamp, None);
                assert_eq!(room_id, RoomId::new("call-1"));
                assert_eq!(offer["sdp"], "v=0...");
            }
            andere => panic!("falsche Variante: {andere:?}"),
        }
    }

    #[test]
    fn offer_ausgehend_unterdrueckt_leere_optionale_felder() {
        let env = Envelope::Offer {
            target: None,
            from: Some(test_id()),
            offer: serde_json::json!({"sdp": "v=0"}),
            room_id: RoomId::new("call-1"),
            timestamp: Some(unix_zeit_ms()),
        };
        let json = serde_json::to_string(&env).unwrap();
        assert!(!json.contains("target"), "target darf nicht auftauchen: {json}");
        assert!(json.contains("\"from\""));
        assert!(json.contains("\"roomId\":\"call-1\""));
    }

    #[test]
    fn ice_candidate_tag_ist_kebab_case() {
        let env = Envelope::IceCandidate {
            target: Some(test_id()),
            from: None,
            candidate: serde_json::json!({"candidate": "candidate:0 1 UDP ..."}),
            room_id: RoomId::new("call-1"),
            timestamp: None,
        };
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.contains("\"type\":\"ice-candidate\""));
    }

    #[test]
    fn ping_ist_nur_ein_tag() {
        let env: Envelope = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(env, Envelope::Ping);
        assert_eq!(serde_json::to_string(&Envelope::Ping).unwrap(), r#"{"type":"ping"}"#);
    }

    #[test]
    fn unbekannter_tag_ist_ein_dekodierfehler() {
        let ergebnis = serde_json::from_str::<Envelope>(r#"{"type":"mute-user","roomId":"x"}"#);
        assert!(ergebnis.is_err());
    }

    #[test]
    fn fehlendes_pflichtfeld_ist_ein_dekodierfehler() {
        // join-room ohne roomId
        let ergebnis = serde_json::from_str::<Envelope>(r#"{"type":"join-room"}"#);
        assert!(ergebnis.is_err());
    }

    #[test]
    fn room_info_liste_serialisiert_als_uuid_strings() {
        let env = Envelope::room_info(RoomId::new("r"), vec![test_id()]);
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.contains("\"members\":[\"00000000-0000-0000-0000-000000000000\"]"));
    }

    #[test]
    fn kind_entspricht_dem_wire_tag() {
        assert_eq!(Envelope::Ping.kind(), "ping");
        assert_eq!(
            Envelope::user_disconnected(test_id(), RoomId::new("r")).kind(),
            "user-disconnected"
        );
    }
}
