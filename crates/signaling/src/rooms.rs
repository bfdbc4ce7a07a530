//! Room Directory – Raum-Mitgliedschaften und Fan-out-Politik
//!
//! Raeume entstehen lazy beim ersten Beitritt und verschwinden sobald das
//! letzte Mitglied geht; einen leeren Raum gibt es im Directory nie.
//!
//! ## Serialisierung
//! Alle Mutationen laufen unter einem Mutex, dessen kritische Abschnitte
//! genau beitreten/verlassen/alle_verlassen sind – einschliesslich des
//! darin ausgefuehrten Benachrichtigungs-Fan-outs. Damit kann sich zwischen
//! Mitgliedschafts-Aenderung und Benachrichtigung kein anderer Beitritt
//! oder Austritt dazwischenschieben: bestehende Mitglieder erfahren vom
//! Neuen, bevor irgendeine andere Mutation sichtbar wird, und der Neue
//! bekommt eine dazu konsistente Mitgliederliste. Zustellung ist ein
//! nicht-blockierendes try_send, der Lock haelt also nie auf fremdes I/O.

use intercom_core::{ClientId, RoomId};
use intercom_observability::{IntercomMetrics, RaumSnapshot};
use intercom_protocol::Envelope;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::registry::ConnectionRegistry;

/// Verwaltet die Mitglieds-Mengen aller aktiven Raeume
///
/// Thread-safe via Arc. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct RoomDirectory {
    inner: Arc<RoomsInner>,
}

struct RoomsInner {
    /// Raum -> Mitglieds-Menge; niemals mit leerer Menge vorhanden
    raeume: Mutex<HashMap<RoomId, HashSet<ClientId>>>,
    registry: ConnectionRegistry,
    metriken: IntercomMetrics,
}

impl RoomDirectory {
    /// Erstellt ein neues RoomDirectory
    pub fn neu(registry: ConnectionRegistry, metriken: IntercomMetrics) -> Self {
        Self {
            inner: Arc::new(RoomsInner {
                raeume: Mutex::new(HashMap::new()),
                registry,
                metriken,
            }),
        }
    }

    /// Fuegt einen Client einem Raum hinzu (erzeugt den Raum bei Bedarf)
    ///
    /// Reihenfolge der Effekte: (1) `user-joined` an alle bisherigen
    /// Mitglieder, (2) `room-info` mit der Mitgliederliste ohne den
    /// Beitretenden an den Beitretenden. Ein wiederholter Beitritt
    /// desselben Clients ist ein vollstaendiger No-op.
    pub fn beitreten(&self, room_id: &RoomId, client_id: ClientId) {
        let mut raeume = self.inner.raeume.lock();
        let mitglieder = raeume.entry(room_id.clone()).or_default();

        if !mitglieder.insert(client_id) {
            tracing::debug!(client_id = %client_id, room_id = %room_id, "Wiederholter Beitritt ignoriert");
            return;
        }

        let andere: Vec<ClientId> = mitglieder
            .iter()
            .copied()
            .filter(|m| *m != client_id)
            .collect();

        for mitglied in &andere {
            self.inner
                .registry
                .senden(mitglied, Envelope::user_joined(client_id, room_id.clone()));
        }
        self.inner
            .registry
            .senden(&client_id, Envelope::room_info(room_id.clone(), andere));

        self.inner.metriken.active_rooms.set(raeume.len() as f64);
        tracing::info!(client_id = %client_id, room_id = %room_id, "Raum beigetreten");
    }

    /// Entfernt einen Client aus einem Raum
    ///
    /// Benachrichtigt die verbleibenden Mitglieder mit `user-left` und
    /// loescht den Raum wenn er leer wird. Einen Raum zu verlassen in dem
    /// man nicht ist – oder der nicht existiert – ist ein stiller No-op.
    pub fn verlassen(&self, room_id: &RoomId, client_id: &ClientId) {
        let mut raeume = self.inner.raeume.lock();
        let Some(mitglieder) = raeume.get_mut(room_id) else {
            return;
        };
        if !mitglieder.remove(client_id) {
            return;
        }

        if mitglieder.is_empty() {
            raeume.remove(room_id);
            tracing::debug!(room_id = %room_id, "Raum geloescht (leer)");
        } else {
            for mitglied in mitglieder.iter() {
                self.inner
                    .registry
                    .senden(mitglied, Envelope::user_left(*client_id, room_id.clone()));
            }
        }

        self.inner.metriken.active_rooms.set(raeume.len() as f64);
        tracing::info!(client_id = %client_id, room_id = %room_id, "Raum verlassen");
    }

    /// Entfernt einen Client aus allen Raeumen (Verbindungsabbau)
    ///
    /// Verbleibende Mitglieder jedes betroffenen Raums erhalten genau ein
    /// `user-disconnected`; leer gewordene Raeume werden geloescht.
    pub fn alle_verlassen(&self, client_id: &ClientId) {
        let mut raeume = self.inner.raeume.lock();
        let mut leere: Vec<RoomId> = Vec::new();

        for (room_id, mitglieder) in raeume.iter_mut() {
            if !mitglieder.remove(client_id) {
                continue;
            }
            if mitglieder.is_empty() {
                leere.push(room_id.clone());
            } else {
                for mitglied in mitglieder.iter() {
                    self.inner.registry.senden(
                        mitglied,
                        Envelope::user_disconnected(*client_id, room_id.clone()),
                    );
                }
            }
            tracing::debug!(client_id = %client_id, room_id = %room_id, "Aus Raum entfernt (Trennung)");
        }

        for room_id in leere {
            raeume.remove(&room_id);
            tracing::debug!(room_id = %room_id, "Raum geloescht (leer)");
        }

        self.inner.metriken.active_rooms.set(raeume.len() as f64);
    }

    /// Gibt die Mitglieder eines Raums zurueck; leer wenn der Raum nicht existiert
    pub fn mitglieder(&self, room_id: &RoomId) -> Vec<ClientId> {
        self.inner
            .raeume
            .lock()
            .get(room_id)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Gibt die Anzahl aktiver Raeume zurueck
    pub fn raum_anzahl(&self) -> usize {
        self.inner.raeume.lock().len()
    }

    /// Mitglieder-Snapshot aller Raeume fuer `/status`
    pub fn snapshots(&self) -> Vec<RaumSnapshot> {
        let raeume = self.inner.raeume.lock();
        let mut snapshots: Vec<RaumSnapshot> = raeume
            .iter()
            .map(|(room_id, mitglieder)| {
                let mut members: Vec<String> =
                    mitglieder.iter().map(|m| m.inner().to_string()).collect();
                members.sort(); // stabile Ausgabe
                RaumSnapshot {
                    room_id: room_id.as_str().to_string(),
                    member_count: members.len(),
                    members,
                }
            })
            .collect();
        snapshots.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        snapshots
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn test_umgebung() -> (ConnectionRegistry, RoomDirectory) {
        let metriken = IntercomMetrics::neu().unwrap();
        let registry = ConnectionRegistry::neu(metriken.clone());
        let rooms = RoomDirectory::neu(registry.clone(), metriken);
        (registry, rooms)
    }

    fn alle_envelopes(rx: &mut mpsc::Receiver<Envelope>) -> Vec<Envelope> {
        let mut envelopes = Vec::new();
        while let Ok(e) = rx.try_recv() {
            envelopes.push(e);
        }
        envelopes
    }

    #[tokio::test]
    async fn beitritt_erzeugt_raum_lazy() {
        let (registry, rooms) = test_umgebung();
        let raum = RoomId::new("call-1");
        assert_eq!(rooms.raum_anzahl(), 0);
        assert!(rooms.mitglieder(&raum).is_empty());

        let (a, _rx) = registry.registrieren();
        rooms.beitreten(&raum, a);
        assert_eq!(rooms.raum_anzahl(), 1);
        assert_eq!(rooms.mitglieder(&raum), vec![a]);
    }

    #[tokio::test]
    async fn beitritts_reihenfolge_und_inhalte() {
        let (registry, rooms) = test_umgebung();
        let raum = RoomId::new("call-1");
        let (a, mut rx_a) = registry.registrieren();
        let (b, mut rx_b) = registry.registrieren();

        rooms.beitreten(&raum, a);
        let bei_a = alle_envelopes(&mut rx_a);
        // A bekommt nur room-info mit leerer Liste
        assert_eq!(bei_a.len(), 1);
        match &bei_a[0] {
            Envelope::RoomInfo { members, .. } => assert!(members.is_empty()),
            andere => panic!("room-info erwartet, war {andere:?}"),
        }

        rooms.beitreten(&raum, b);
        let bei_a = alle_envelopes(&mut rx_a);
        let bei_b = alle_envelopes(&mut rx_b);

        // A erfaehrt von B
        assert_eq!(bei_a.len(), 1);
        match &bei_a[0] {
            Envelope::UserJoined { client_id, .. } => assert_eq!(*client_id, b),
            andere => panic!("user-joined erwartet, war {andere:?}"),
        }

        // B bekommt room-info mit [A] und nie ein user-joined ueber sich selbst
        assert_eq!(bei_b.len(), 1);
        match &bei_b[0] {
            Envelope::RoomInfo { members, .. } => assert_eq!(members, &vec![a]),
            andere => panic!("room-info erwartet, war {andere:?}"),
        }
    }

    #[tokio::test]
    async fn wiederholter_beitritt_ist_vollstaendiger_noop() {
        let (registry, rooms) = test_umgebung();
        let raum = RoomId::new("call-1");
        let (a, mut rx_a) = registry.registrieren();
        let (b, mut rx_b) = registry.registrieren();

        rooms.beitreten(&raum, a);
        rooms.beitreten(&raum, b);
        alle_envelopes(&mut rx_a);
        alle_envelopes(&mut rx_b);

        rooms.beitreten(&raum, b);
        assert_eq!(rooms.mitglieder(&raum).len(), 2);
        // Kein doppeltes user-joined bei A, kein weiteres room-info bei B
        assert!(alle_envelopes(&mut rx_a).is_empty());
        assert!(alle_envelopes(&mut rx_b).is_empty());
    }

    #[tokio::test]
    async fn verlassen_benachrichtigt_genau_die_verbleibenden() {
        let (registry, rooms) = test_umgebung();
        let raum = RoomId::new("call-1");
        let (a, mut rx_a) = registry.registrieren();
        let (b, mut rx_b) = registry.registrieren();
        let (c, mut rx_c) = registry.registrieren();

        for id in [a, b, c] {
            rooms.beitreten(&raum, id);
        }
        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            alle_envelopes(rx);
        }

        rooms.verlassen(&raum, &b);

        // N-1 Zustellungen: A und C, nicht B
        for (id, rx) in [(a, &mut rx_a), (c, &mut rx_c)] {
            let envelopes = alle_envelopes(rx);
            assert_eq!(envelopes.len(), 1, "Mitglied {id} muss genau ein user-left sehen");
            match &envelopes[0] {
                Envelope::UserLeft { client_id, .. } => assert_eq!(*client_id, b),
                andere => panic!("user-left erwartet, war {andere:?}"),
            }
        }
        assert!(alle_envelopes(&mut rx_b).is_empty());
        assert_eq!(rooms.mitglieder(&raum).len(), 2);
        assert_eq!(rooms.raum_anzahl(), 1);
    }

    #[tokio::test]
    async fn letzter_austritt_loescht_den_raum() {
        let (registry, rooms) = test_umgebung();
        let raum = RoomId::new("call-1");
        let (a, _rx_a) = registry.registrieren();

        rooms.beitreten(&raum, a);
        rooms.verlassen(&raum, &a);
        assert_eq!(rooms.raum_anzahl(), 0);
        assert!(rooms.mitglieder(&raum).is_empty());
    }

    #[tokio::test]
    async fn verlassen_ohne_mitgliedschaft_ist_stiller_noop() {
        let (registry, rooms) = test_umgebung();
        let raum = RoomId::new("call-1");
        let (a, _rx_a) = registry.registrieren();
        let (b, mut rx_b) = registry.registrieren();

        // Unbekannter Raum
        rooms.verlassen(&RoomId::new("gibts-nicht"), &a);

        // Bekannter Raum, aber kein Mitglied
        rooms.beitreten(&raum, b);
        alle_envelopes(&mut rx_b);
        rooms.verlassen(&raum, &a);

        assert_eq!(rooms.mitglieder(&raum).len(), 1);
        assert!(alle_envelopes(&mut rx_b).is_empty(), "kein user-left fuer Nicht-Mitglied");
    }

    #[tokio::test]
    async fn mitgliedschaft_entspricht_letzter_operation() {
        let (registry, rooms) = test_umgebung();
        let raum = RoomId::new("call-1");
        let (a, _rx_a) = registry.registrieren();

        rooms.beitreten(&raum, a);
        rooms.beitreten(&raum, a);
        rooms.verlassen(&raum, &a);
        rooms.verlassen(&raum, &a);
        assert!(rooms.mitglieder(&raum).is_empty());

        rooms.beitreten(&raum, a);
        assert_eq!(rooms.mitglieder(&raum), vec![a]);
    }

    #[tokio::test]
    async fn trennung_raeumt_alle_raeume_auf() {
        let (registry, rooms) = test_umgebung();
        let r1 = RoomId::new("call-1");
        let r2 = RoomId::new("call-2");
        let (a, _rx_a) = registry.registrieren();
        let (b, mut rx_b) = registry.registrieren();
        let (c, mut rx_c) = registry.registrieren();

        // A ist in beiden Raeumen, B nur in r1, C nur in r2
        rooms.beitreten(&r1, a);
        rooms.beitreten(&r1, b);
        rooms.beitreten(&r2, a);
        rooms.beitreten(&r2, c);
        alle_envelopes(&mut rx_b);
        alle_envelopes(&mut rx_c);

        rooms.alle_verlassen(&a);

        assert_eq!(rooms.mitglieder(&r1), vec![b]);
        assert_eq!(rooms.mitglieder(&r2), vec![c]);

        for rx in [&mut rx_b, &mut rx_c] {
            let envelopes = alle_envelopes(rx);
            assert_eq!(envelopes.len(), 1);
            match &envelopes[0] {
                Envelope::UserDisconnected { client_id, .. } => assert_eq!(*client_id, a),
                andere => panic!("user-disconnected erwartet, war {andere:?}"),
            }
        }
    }

    #[tokio::test]
    async fn trennung_loescht_leer_gewordene_raeume() {
        let (registry, rooms) = test_umgebung();
        let (a, _rx_a) = registry.registrieren();

        rooms.beitreten(&RoomId::new("solo-1"), a);
        rooms.beitreten(&RoomId::new("solo-2"), a);
        assert_eq!(rooms.raum_anzahl(), 2);

        rooms.alle_verlassen(&a);
        assert_eq!(rooms.raum_anzahl(), 0);
    }

    #[tokio::test]
    async fn snapshots_sind_sortiert_und_vollstaendig() {
        let (registry, rooms) = test_umgebung();
        let (a, _rx_a) = registry.registrieren();
        let (b, _rx_b) = registry.registrieren();

        rooms.beitreten(&RoomId::new("beta"), a);
        rooms.beitreten(&RoomId::new("alpha"), a);
        rooms.beitreten(&RoomId::new("alpha"), b);

        let snapshots = rooms.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].room_id, "alpha");
        assert_eq!(snapshots[0].member_count, 2);
        assert_eq!(snapshots[1].room_id, "beta");
        assert_eq!(snapshots[1].member_count, 1);
    }
}
