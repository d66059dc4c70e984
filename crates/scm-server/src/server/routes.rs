//! Router configuration and route definitions.

use axum::{Router, routing::get};

use super::app_state::AppState;
use crate::handlers;

/// Creates the router with every RPC and admin endpoint.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .merge(create_rpc_routes())
        .merge(create_admin_routes())
}

/// Datanode-facing RPCs (§4.4, §4.5, §6).
fn create_rpc_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/register", axum::routing::post(handlers::register::register))
        .route("/v1/heartbeat", axum::routing::post(handlers::heartbeat::heartbeat))
        .route("/v1/version", get(handlers::admin::version))
}

/// Read-only admin/management surface (spec.md §6 "Observable management
/// surface").
fn create_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/nodes", get(handlers::admin::list_nodes))
        .route("/v1/nodes/:uuid", get(handlers::admin::get_node))
        .route("/v1/stats/cluster", get(handlers::admin::cluster_stat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scm_core::config::RegistryConfig;

    async fn mock_app_state() -> AppState {
        super::super::app_state::initialize_app_state(
            RegistryConfig::default(),
            "scm-test".to_string(),
            "cluster-test".to_string(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_router_builds_with_state() {
        let router = create_router();
        let app_state = mock_app_state().await;
        let _router_with_state: axum::Router = router.with_state(app_state);
    }
}
