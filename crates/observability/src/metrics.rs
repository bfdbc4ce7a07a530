//! Prometheus-kompatible Metriken fuer den Intercom-Relay
//!
//! Registrierte Metriken:
//! - `intercom_connected_clients` – Gauge: Aktuell verbundene Clients
//! - `intercom_active_rooms` – Gauge: Aktive Raeume
//! - `intercom_messages_total` – Counter: Dekodierte eingehende Envelopes (kind)
//! - `intercom_delivery_failures_total` – Counter: Fehlgeschlagene Zustellungen

use anyhow::Result;
use axum::{response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Alle Intercom-Prometheus-Metriken
///
/// Thread-safe via Arc-Registry. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct IntercomMetrics {
    pub registry: Arc<Registry>,

    /// Aktuell verbundene Clients
    pub connected_clients: Gauge,
    /// Aktive Raeume (Raeume mit mindestens einem Mitglied)
    pub active_rooms: Gauge,
    /// Dekodierte eingehende Envelopes, gelabelt nach Nachrichtenart
    pub messages_total: IntCounterVec,
    /// Zustellversuche an unbekannte, getrennte oder ueberlastete Clients
    pub delivery_failures_total: IntCounter,
}

impl IntercomMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let connected_clients = Gauge::with_opts(Opts::new(
            "intercom_connected_clients",
            "Anzahl aktuell verbundener Clients",
        ))?;
        registry.register(Box::new(connected_clients.clone()))?;

        let active_rooms = Gauge::with_opts(Opts::new(
            "intercom_active_rooms",
            "Anzahl aktiver Raeume",
        ))?;
        registry.register(Box::new(active_rooms.clone()))?;

        let messages_total = IntCounterVec::new(
            Opts::new(
                "intercom_messages_total",
                "Gesamtanzahl dekodierter eingehender Envelopes",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(messages_total.clone()))?;

        let delivery_failures_total = IntCounter::with_opts(Opts::new(
            "intercom_delivery_failures_total",
            "Gesamtanzahl fehlgeschlagener Zustellungen",
        ))?;
        registry.register(Box::new(delivery_failures_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            connected_clients,
            active_rooms,
            messages_total,
            delivery_failures_total,
        })
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: IntercomMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(
    axum::extract::State(metriken): axum::extract::State<IntercomMetrics>,
) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            axum::http::StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
