//! intercom-server – Bibliotheks-Root
//!
//! Baut aus der Konfiguration den Relay-Zustand und den HTTP/WebSocket-
//! Router zusammen und laeuft bis zum Shutdown-Signal.

pub mod config;

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use config::ServerConfig;
use intercom_observability::{
    health_router, metrics_router, status_router, timing_middleware, IntercomMetrics,
    RelayStatusQuelle,
};
use intercom_signaling::{ws_router, SignalingConfig, SignalingState};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Baut den kompletten Router: Signaling plus Introspektion
    ///
    /// `/ws` (Upgrade), `/health`, `/status` und – falls aktiviert –
    /// `/metrics` teilen sich einen Listener. CORS ist offen; die
    /// Introspektions-Endpunkte sind rein lesend.
    pub fn router(state: Arc<SignalingState>, metriken: IntercomMetrics, metriken_endpunkt: bool) -> Router {
        let quelle: Arc<dyn RelayStatusQuelle> = state.clone();

        let mut app = Router::new()
            .merge(ws_router(state))
            .merge(health_router(Arc::clone(&quelle)))
            .merge(status_router(quelle));

        if metriken_endpunkt {
            app = app.merge(metrics_router(metriken));
        }

        app.layer(CorsLayer::permissive())
            .layer(axum::middleware::from_fn(timing_middleware))
    }

    /// Startet den Relay und laeuft bis zum Shutdown-Signal (Ctrl-C)
    pub async fn starten(self) -> Result<()> {
        let metriken = IntercomMetrics::neu()?;
        let state = SignalingState::neu(
            SignalingConfig {
                server_name: self.config.server.name.clone(),
                max_clients: self.config.server.max_clients,
            },
            metriken.clone(),
        );

        let app = Self::router(state, metriken, self.config.observability.metriken);

        let bind_adresse = self.config.http_bind_adresse();
        let listener = tokio::net::TcpListener::bind(&bind_adresse).await?;

        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %bind_adresse,
            max_clients = self.config.server.max_clients,
            "Intercom Relay gestartet"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Intercom Relay beendet");
        Ok(())
    }
}

/// Wartet auf Ctrl-C / SIGINT
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(fehler = %e, "Shutdown-Signal nicht verfuegbar");
        return;
    }
    tracing::info!("Shutdown-Signal empfangen, Relay wird beendet");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn router_laesst_sich_mit_und_ohne_metriken_bauen() {
        let metriken = IntercomMetrics::neu().unwrap();
        let state = SignalingState::neu(SignalingConfig::default(), metriken.clone());
        let _mit = Server::router(Arc::clone(&state), metriken.clone(), true);
        let _ohne = Server::router(state, metriken, false);
    }
}
