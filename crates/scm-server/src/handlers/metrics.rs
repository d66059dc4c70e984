//! Prometheus text-format exporter. `scm-core` itself never exposes an HTTP
//! endpoint (its Non-goals exclude owning a metrics exporter) — this binary
//! is the boundary that does.

use axum::{extract::State, http::header, response::IntoResponse};
use prometheus::{Encoder, TextEncoder};

use crate::server::AppState;

pub async fn metrics(State(app_state): State<AppState>) -> impl IntoResponse {
    let registry = app_state.registry.metrics_registry();
    let metric_families = registry.gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(error) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(%error, "failed to encode metrics");
    }
    ([(header::CONTENT_TYPE, encoder.format_type().to_string())], buffer)
}
