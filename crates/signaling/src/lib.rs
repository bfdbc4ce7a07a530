//! intercom-signaling – WebSocket Signaling-Relay
//!
//! Dieser Crate implementiert den Signaling-Kern von Intercom. Er verwaltet
//! WebSocket-Verbindungen, Raum-Mitgliedschaften und leitet
//! Session-Negotiation (Offer/Answer/ICE) zwischen Peers weiter. Medien
//! fliessen nie durch den Relay.
//!
//! ## Architektur
//!
//! ```text
//! HTTP-Listener (/ws Upgrade)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  State Machine: Connecting -> Open -> Closed
//!     |
//!     v
//! MessageDispatcher
//!     |
//!     +-- join-room / leave-room      -> RoomDirectory
//!     +-- offer / answer / candidate  -> ConnectionRegistry (Punkt-zu-Punkt)
//!     +-- ping                        -> pong an den Absender
//!
//! LifecycleSupervisor – Verbindungsaufbau und -abbau
//! RoomDirectory       – Wer ist in welchem Raum, Fan-out-Politik
//! ConnectionRegistry  – Identitaet -> Send-Queue, Zustell-Primitiv
//! ```

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod rooms;
pub mod server_state;
pub mod ws;

// Bequeme Re-Exporte
pub use dispatcher::MessageDispatcher;
pub use error::{SignalingError, SignalingResult};
pub use lifecycle::LifecycleSupervisor;
pub use registry::ConnectionRegistry;
pub use rooms::RoomDirectory;
pub use server_state::{SignalingConfig, SignalingState};
pub use ws::ws_router;
