//! `NodeRegistry`: the top-level facade composing `NodeTable`,
//! `HealthStateMachine`, `CommandQueue`, `HeartbeatProcessor`, `Registrar`,
//! `ReportRouter`, `StatsView`, and `EventBridge` under a single registry
//! write lock (§5, §9 design notes: "prefer a single write-lock boundary").

use crate::clock::Clock;
use crate::command_queue::CommandQueue;
use crate::config::RegistryConfig;
use crate::context::{LayoutVersionManager, PipelineManager, ScmContext};
use crate::error::{Error, Result};
use crate::events::{CommandForDatanode, EventBridge, EventPublisher, RegistryEvent};
use crate::health::HealthStateMachine;
use crate::heartbeat::{HeartbeatProcessor, HeartbeatRequest};
use crate::identity::DatanodeIdentity;
use crate::metrics::RegistryMetrics;
use crate::models::command::SCMCommand;
use crate::models::record::{DatanodeRecord, HealthState, NodeStatus, OperationalState};
use crate::node_table::NodeTable;
use crate::registrar::{RegisterRequest, RegisterResponse, Registrar};
use crate::stats::{StatsView, UsageTotals};
use crate::topology::{NetworkTopology, NodeResolver};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// `getVersion` response (§6 response shapes).
#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub version: String,
    pub scm_id: String,
    pub cluster_id: String,
}

/// Collaborators a `NodeRegistry` is constructed with (§6 consumed
/// interfaces). All are injected so tests can supply fakes (`FakeClock`,
/// `StaticScmContext`, `NullResolver`, ...).
pub struct RegistryDeps {
    pub clock: Arc<dyn Clock>,
    pub topology: Arc<dyn NetworkTopology>,
    pub resolver: Arc<dyn NodeResolver>,
    pub layout_manager: Arc<dyn LayoutVersionManager>,
    pub scm_context: Arc<dyn ScmContext>,
    pub pipeline_manager: Arc<dyn PipelineManager>,
    pub event_publisher: Arc<dyn EventPublisher>,
}

/// The registry-wide facade. Every mutating entry point takes the write
/// guard on `lock` for its duration; snapshot reads take the read guard
/// just long enough to copy out (§5 lock rules).
pub struct NodeRegistry {
    lock: RwLock<()>,
    table: NodeTable,
    command_queue: CommandQueue,
    health: HealthStateMachine,
    bridge: EventBridge,
    deps: RegistryDeps,
    config: RegistryConfig,
    metrics: RegistryMetrics,
    scm_id: String,
    cluster_id: String,
}

impl NodeRegistry {
    /// `init(config, collaborators)` (§9 design notes: process-wide
    /// lifecycle is `init -> run -> close`, no implicit module-level state).
    pub fn init(config: RegistryConfig, deps: RegistryDeps, scm_id: String, cluster_id: String) -> Result<Self> {
        config.validate()?;
        let metrics = RegistryMetrics::new(&config.metrics);
        let health = HealthStateMachine::new(config.health.clone(), deps.clock.clone());
        let bridge = EventBridge::new(deps.event_publisher.clone());

        Ok(Self {
            lock: RwLock::new(()),
            table: NodeTable::new(),
            command_queue: CommandQueue::new(),
            health,
            bridge,
            deps,
            config,
            metrics,
            scm_id,
            cluster_id,
        })
    }

    /// Runs one health-scanner tick. A real deployment drives this from a
    /// `tokio::time::interval` loop at `config.health.scan_interval_millis`
    /// (§5: "the scanner runs as a dedicated async task").
    pub fn run_scanner_tick(&self) {
        let _guard = self.lock.write().expect("registry lock poisoned");
        let skipped_before = self.health.skipped_checks();
        self.health.tick(&self.table, &self.bridge);
        if self.health.skipped_checks() > skipped_before {
            self.metrics.record_scanner_skipped();
        }

        for health in [
            HealthState::Healthy,
            HealthState::HealthyReadonly,
            HealthState::Stale,
            HealthState::Dead,
        ] {
            let count = self.table.count(None, Some(health));
            self.metrics.set_nodes_total(&health.to_string(), count as f64);
        }
    }

    /// `close()`: no persistent resources are held by this core (§9
    /// Non-goals: no durability across restarts), so this is a no-op
    /// placeholder for symmetry with the documented lifecycle; embedding
    /// binaries use it as the point to stop their scanner task and flush
    /// metrics/management-bean registrations they themselves own.
    pub fn close(&self) {
        tracing::info!("node registry closing");
    }

    /// §4.5 `register`.
    pub fn register(&self, request: RegisterRequest) -> RegisterResponse {
        let _guard = self.lock.write().expect("registry lock poisoned");
        let registrar = Registrar {
            table: &self.table,
            topology: self.deps.topology.as_ref(),
            resolver: self.deps.resolver.as_ref(),
            layout_manager: self.deps.layout_manager.as_ref(),
            bridge: &self.bridge,
            use_hostname: self.config.layout.use_hostname,
            cluster_id: self.cluster_id.clone(),
            now_millis: self.deps.clock.now_millis(),
        };
        registrar.register(request)
    }

    /// §4.4 `processHeartbeat`. The summary+drain pair inside
    /// `HeartbeatProcessor::process` runs under this same write guard, so
    /// `summary` always reflects exactly what `drain` is about to remove
    /// (§5 lock rules, §8 Testable Property 3).
    pub fn process_heartbeat(&self, request: HeartbeatRequest) -> Vec<SCMCommand> {
        let _guard = self.lock.write().expect("registry lock poisoned");
        let processor = HeartbeatProcessor {
            table: &self.table,
            command_queue: &self.command_queue,
            health: &self.health,
            bridge: &self.bridge,
            scm_context: self.deps.scm_context.as_ref(),
            scm_layout: self.deps.layout_manager.as_ref(),
            clock: self.deps.clock.as_ref(),
            metrics: &self.metrics,
        };
        processor.process(request)
    }

    /// `CommandForDatanode` subscriber half of the `EventBridge` (§4.8, §9
    /// "event cycles": this only ever calls into `CommandQueue::add`, never
    /// back into the publisher, so there is no re-entrancy to guard here).
    pub fn handle_command_for_datanode(&self, message: CommandForDatanode) {
        let _guard = self.lock.write().expect("registry lock poisoned");
        self.command_queue.add(message.dn_uuid, message.command.clone());
        self.metrics.record_command_enqueued(&message.command.command_type.to_string());
        self.bridge.emit(RegistryEvent::DatanodeCommand {
            dn_uuid: message.dn_uuid,
            command: message.command,
        });
    }

    /// Looks up a record by UUID (§4.1 `get`).
    pub fn get_node_by_uuid(&self, uuid: Uuid) -> Result<DatanodeRecord> {
        let _guard = self.lock.read().expect("registry lock poisoned");
        self.table.get(uuid)
    }

    /// Derived `(opState, health, expiry)` for one datanode (§3 `NodeStatus`).
    pub fn get_node_status(&self, uuid: Uuid) -> Result<NodeStatus> {
        Ok(self.get_node_by_uuid(uuid)?.status())
    }

    /// Snapshot listing with optional operational-state/health wildcards
    /// (§4.1 `listByStatus`).
    pub fn get_all_nodes(&self, op_state: Option<OperationalState>, health: Option<HealthState>) -> Vec<DatanodeRecord> {
        let _guard = self.lock.read().expect("registry lock poisoned");
        self.table.list_by_status(op_state, health)
    }

    /// Count with the same wildcarding as `get_all_nodes` (§4.1 `count`).
    pub fn count(&self, op_state: Option<OperationalState>, health: Option<HealthState>) -> usize {
        let _guard = self.lock.read().expect("registry lock poisoned");
        self.table.count(op_state, health)
    }

    /// Admin API: explicit operational-state override, propagating
    /// `NotFound` to the caller (§7: "`setNodeOperationalState` propagates
    /// `NotFound` to the caller").
    pub fn set_node_operational_state(
        &self,
        uuid: Uuid,
        op_state: OperationalState,
        expiry_epoch_sec: i64,
    ) -> Result<()> {
        let _guard = self.lock.write().expect("registry lock poisoned");
        let mut record = self.table.get(uuid)?;
        record.persisted_op_state = op_state;
        record.op_state_expiry_epoch_sec = expiry_epoch_sec;
        self.table.update(record)
    }

    /// Adds a container ID to a datanode's hosted set (§9 design notes).
    pub fn add_container(&self, uuid: Uuid, container_id: i64) -> Result<()> {
        self.mutate_record(uuid, |record| {
            record.container_set.insert(container_id);
        })
    }

    /// Removes a container ID from a datanode's hosted set.
    pub fn remove_container(&self, uuid: Uuid, container_id: i64) -> Result<()> {
        self.mutate_record(uuid, |record| {
            record.container_set.remove(&container_id);
        })
    }

    /// Replaces a datanode's entire container set.
    pub fn set_containers(&self, uuid: Uuid, container_ids: std::collections::HashSet<i64>) -> Result<()> {
        self.mutate_record(uuid, |record| {
            record.container_set = container_ids;
        })
    }

    /// Snapshot of a datanode's current container set.
    pub fn get_containers(&self, uuid: Uuid) -> Result<std::collections::HashSet<i64>> {
        Ok(self.get_node_by_uuid(uuid)?.container_set)
    }

    /// Adds a pipeline ID to a datanode's membership set.
    pub fn add_pipeline(&self, uuid: Uuid, pipeline_id: Uuid) -> Result<()> {
        self.mutate_record(uuid, |record| {
            record.pipeline_set.insert(pipeline_id);
        })
    }

    /// Removes a pipeline ID from a datanode's membership set.
    pub fn remove_pipeline(&self, uuid: Uuid, pipeline_id: Uuid) -> Result<()> {
        self.mutate_record(uuid, |record| {
            record.pipeline_set.remove(&pipeline_id);
        })
    }

    fn mutate_record(&self, uuid: Uuid, f: impl FnOnce(&mut DatanodeRecord)) -> Result<()> {
        let _guard = self.lock.write().expect("registry lock poisoned");
        let mut record = self.table.get(uuid)?;
        f(&mut record);
        self.table.update(record)
    }

    /// Read-only aggregate/topology view (§4.7). Borrows live only for the
    /// duration of the closure passed to callers; `StatsView` itself copies
    /// out of `NodeTable` snapshots, so no lock needs to be held across it
    /// beyond what `NodeTable`'s internal structures already provide.
    pub fn stats(&self) -> StatsView<'_> {
        StatsView {
            table: &self.table,
            pipelines: self.deps.pipeline_manager.as_ref(),
            pipelines_per_metadata_volume: self.config.layout.pipelines_per_metadata_volume,
            datanode_pipeline_limit_override: self.config.layout.datanode_pipeline_limit,
        }
    }

    /// Cluster-wide usage totals, a convenience wrapper over `stats()`
    /// (§4.7 `clusterStat`).
    pub fn cluster_stat(&self) -> UsageTotals {
        self.stats().cluster_stat()
    }

    /// `getVersion` (§6 response shapes).
    pub fn get_version(&self) -> VersionInfo {
        VersionInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            scm_id: self.scm_id.clone(),
            cluster_id: self.cluster_id.clone(),
        }
    }

    /// Total command-count query across every requested type, acquiring the
    /// read lock once so counts are consistent across types (§5: "acquires
    /// the read lock once and computes all requested types to guarantee
    /// inter-type consistency").
    pub fn get_total_datanode_command_counts(
        &self,
        uuid: Uuid,
        types: &[crate::models::command::CommandType],
    ) -> std::collections::HashMap<crate::models::command::CommandType, usize> {
        let _guard = self.lock.read().expect("registry lock poisoned");
        types
            .iter()
            .map(|t| (*t, self.command_queue.count_by_type(uuid, *t)))
            .collect()
    }

    /// `getCommandQueue(uuid)`: documented historically as a read, actually
    /// a drain (§9 Open Question 1). Exposed here under its drain name;
    /// `NodeRegistry::process_heartbeat` is the only normal caller.
    pub fn get_command_queue(&self, uuid: Uuid) -> Vec<SCMCommand> {
        let _guard = self.lock.write().expect("registry lock poisoned");
        self.command_queue.drain(uuid)
    }

    /// Returns the registry's Prometheus registry for `scm-server`'s
    /// `/metrics` exporter.
    pub fn metrics_registry(&self) -> Arc<prometheus::Registry> {
        self.metrics.registry()
    }

    pub fn identity_for(&self, uuid: Uuid) -> Result<DatanodeIdentity> {
        Ok(self.get_node_by_uuid(uuid)?.identity)
    }
}

/// `AlreadyExists`/`NotFound` propagation helper used by callers that want
/// to log-then-swallow benign registration idempotence (§7).
pub fn is_benign_registration_error(error: &Error) -> bool {
    matches!(error, Error::AlreadyExists(_))
}
