//! Application state and initialization.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use scm_core::clock::SystemClock;
use scm_core::config::RegistryConfig;
use scm_core::context::{InMemoryPipelineManager, StaticLayoutVersionManager, StaticScmContext};
use scm_core::events::TracingEventPublisher;
use scm_core::registry::{NodeRegistry, RegistryDeps};
use scm_core::topology::{InMemoryTopology, NullResolver};
use tracing::info;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<NodeRegistry>,
}

/// Builds the registry's collaborators and spawns the health scanner task
/// (§5: "the scanner runs as a dedicated async task").
///
/// This binary always runs as the cluster's sole SCM, so it is wired up as
/// an unconditional leader at term 1 and tracks layout version 1 with no
/// pending finalization. A true multi-SCM deployment would source
/// `ScmContext`/`LayoutVersionManager` from a Raft/JMX-equivalent
/// coordination layer instead of the static doubles used here.
pub async fn initialize_app_state(
    config: RegistryConfig,
    scm_id: String,
    cluster_id: String,
) -> Result<AppState> {
    info!("initializing node registry");
    let deps = RegistryDeps {
        clock: Arc::new(SystemClock),
        topology: Arc::new(InMemoryTopology::new()),
        resolver: Arc::new(NullResolver),
        layout_manager: Arc::new(StaticLayoutVersionManager::new(1, 1)),
        scm_context: Arc::new(StaticScmContext::leader(1)),
        pipeline_manager: Arc::new(InMemoryPipelineManager::new()),
        event_publisher: Arc::new(TracingEventPublisher),
    };

    let scan_interval = Duration::from_millis(config.health.scan_interval_millis);
    let registry = Arc::new(NodeRegistry::init(config, deps, scm_id, cluster_id)?);

    let scanner_registry = registry.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(scan_interval);
        loop {
            ticker.tick().await;
            scanner_registry.run_scanner_tick();
        }
    });

    Ok(AppState { registry })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn initialize_app_state_builds_a_leader_registry() {
        let app_state = initialize_app_state(
            RegistryConfig::default(),
            "scm-1".to_string(),
            "cluster-1".to_string(),
        )
        .await
        .unwrap();

        let version = app_state.registry.get_version();
        assert_eq!(version.scm_id, "scm-1");
        assert_eq!(version.cluster_id, "cluster-1");
    }
}
