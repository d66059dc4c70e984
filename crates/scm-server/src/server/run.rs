//! Middleware configuration and server startup.

use anyhow::Result;
use axum::Router;
use scm_core::config::RegistryConfig;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::{app_state::initialize_app_state, routes::create_router};

/// Runs the SCM registry HTTP server.
pub async fn run(config: RegistryConfig, scm_id: String, cluster_id: String) -> Result<()> {
    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0))),
        config.server.port,
    ));

    let app = create_app(config, scm_id, cluster_id).await?;

    info!("scm-server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the Axum application with every route and the shared registry
/// state, without binding a listener (used directly by tests).
pub async fn create_app(config: RegistryConfig, scm_id: String, cluster_id: String) -> Result<Router> {
    let app_state = initialize_app_state(config, scm_id, cluster_id).await?;
    let router = create_router();
    let app = router.with_state(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_app_builds_successfully() {
        let result = create_app(
            RegistryConfig::default(),
            "scm-test".to_string(),
            "cluster-test".to_string(),
        )
        .await;
        assert!(result.is_ok());
    }

    #[test]
    fn socket_addr_falls_back_on_invalid_host() {
        let mut config = RegistryConfig::default();
        config.server.host = "not-an-ip".to_string();
        config.server.port = 9861;

        let ip = config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)));
        let addr = SocketAddr::from((ip, config.server.port));
        assert_eq!(addr.port(), 9861);
    }
}
