//! Builds the ephemeral, in-process `NodeRegistry` this CLI drives commands
//! against.
//!
//! `scm-core` carries no persistence across process restarts (§9
//! Non-goals), so every invocation of this binary starts from an empty
//! registry. `--seed` exists so a single invocation can register synthetic
//! datanodes and immediately query/mutate them in one session, which is
//! the only way `show-node`/`set-opstate` see anything without a real SCM
//! process to attach to.

use std::sync::Arc;

use scm_core::clock::SystemClock;
use scm_core::config::RegistryConfig;
use scm_core::context::{InMemoryPipelineManager, StaticLayoutVersionManager, StaticScmContext};
use scm_core::events::TracingEventPublisher;
use scm_core::models::{LayoutInfo, StorageReport, StorageType};
use scm_core::registrar::RegisterRequest;
use scm_core::registry::{NodeRegistry, RegistryDeps};
use scm_core::topology::{InMemoryTopology, NullResolver};
use uuid::Uuid;

pub fn build_registry(seed: u32) -> NodeRegistry {
    let deps = RegistryDeps {
        clock: Arc::new(SystemClock),
        topology: Arc::new(InMemoryTopology::new()),
        resolver: Arc::new(NullResolver),
        layout_manager: Arc::new(StaticLayoutVersionManager::new(1, 1)),
        scm_context: Arc::new(StaticScmContext::leader(1)),
        pipeline_manager: Arc::new(InMemoryPipelineManager::new()),
        event_publisher: Arc::new(TracingEventPublisher),
    };
    let registry = NodeRegistry::init(
        RegistryConfig::default(),
        deps,
        "scm-cli".to_string(),
        "cluster-1".to_string(),
    )
    .expect("default config is valid");

    for i in 0..seed {
        registry.register(RegisterRequest {
            uuid: Uuid::new_v4(),
            host_name: format!("dn-{i}"),
            ip_address: format!("10.0.0.{}", i + 1),
            node_report: vec![StorageReport {
                storage_location: "/data/0".to_string(),
                storage_type: StorageType::Disk,
                capacity: 1_000_000,
                used: 100_000 * u64::from(i % 5),
                remaining: 1_000_000 - 100_000 * u64::from(i % 5),
                healthy: true,
            }],
            layout: LayoutInfo::matched(1),
        });
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_registers_exactly_n_nodes() {
        let registry = build_registry(3);
        assert_eq!(registry.count(None, None), 3);
    }

    #[test]
    fn zero_seed_leaves_registry_empty() {
        let registry = build_registry(0);
        assert_eq!(registry.count(None, None), 0);
    }
}
