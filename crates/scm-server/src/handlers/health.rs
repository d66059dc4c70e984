//! Liveness check handler.

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;
use tracing::debug;

use crate::handlers::ServerResult;
use crate::server::AppState;

pub async fn health_check(
    State(_app_state): State<AppState>,
) -> ServerResult<(StatusCode, Json<serde_json::Value>)> {
    debug!("health check requested");
    let response = json!({
        "status": "healthy",
        "service": "scm-registry",
        "version": env!("CARGO_PKG_VERSION"),
    });
    Ok((StatusCode::OK, Json(response)))
}
