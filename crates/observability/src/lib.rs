//! # intercom-observability
//!
//! Observability-Crate fuer den Intercom Signaling-Relay:
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Health-Check und Status-Snapshot (`/health`, `/status`)
//! - Structured Logging via tracing-subscriber
//! - Request-Timing Middleware

pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;

pub use health::{health_router, status_router, RaumSnapshot, RelayStatusQuelle};
pub use logging::logging_initialisieren;
pub use metrics::{metrics_router, IntercomMetrics};
pub use middleware::timing_middleware;
