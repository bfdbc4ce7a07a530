//! intercom-core – Gemeinsame Identitaetstypen
//!
//! Dieses Crate stellt die fundamentalen ID-Typen bereit, die von allen
//! anderen Intercom-Crates gemeinsam genutzt werden.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{ClientId, RoomId};
