//! intercom-protocol – Wire-Protokoll des Signaling-Relays
//!
//! Dieses Crate definiert den `Envelope`: die eine Nachrichteneinheit die
//! als JSON-Textframe ueber die WebSocket-Verbindung laeuft.

pub mod envelope;

pub use envelope::{unix_zeit_ms, Envelope};
