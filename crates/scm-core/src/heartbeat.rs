//! Heartbeat entry point: liveness, layout, operational-state reconciliation,
//! and command-queue drain (§4.4).

use crate::clock::Clock;
use crate::command_queue::CommandQueue;
use crate::context::{LayoutVersionManager, ScmContext};
use crate::events::{EventBridge, RegistryEvent};
use crate::health::HealthStateMachine;
use crate::metrics::RegistryMetrics;
use crate::models::command::{CommandPayload, CommandType, SCMCommand};
use crate::models::layout::LayoutInfo;
use crate::models::record::OperationalState;
use crate::node_table::NodeTable;
use crate::report_router::ReportRouter;
use std::collections::HashMap;
use uuid::Uuid;

/// `processHeartbeat` request payload (§4.4 inputs).
#[derive(Debug, Clone)]
pub struct HeartbeatRequest {
    pub uuid: Uuid,
    pub layout: LayoutInfo,
    pub reported_op_state: OperationalState,
    pub reported_op_state_expiry_epoch_sec: i64,
    pub command_queue_report: Option<HashMap<CommandType, i64>>,
}

/// Collaborators for one heartbeat call, borrowed from the owning
/// `NodeRegistry` for the duration of `process`.
pub struct HeartbeatProcessor<'a> {
    pub table: &'a NodeTable,
    pub command_queue: &'a CommandQueue,
    pub health: &'a HealthStateMachine,
    pub bridge: &'a EventBridge,
    pub scm_context: &'a dyn ScmContext,
    pub scm_layout: &'a dyn LayoutVersionManager,
    pub clock: &'a dyn Clock,
    pub metrics: &'a RegistryMetrics,
}

impl<'a> HeartbeatProcessor<'a> {
    /// Runs the full heartbeat sequence (§4.4 steps 1-6) and returns the
    /// drained command batch. Never fails the caller: an unregistered
    /// identity increments `hbProcessingFailed` and returns an empty list
    /// (§7 propagation policy).
    pub fn process(&self, request: HeartbeatRequest) -> Vec<SCMCommand> {
        self.metrics.record_heartbeat();

        // Step 1: verify identity is registered.
        if self.table.get(request.uuid).is_err() {
            tracing::warn!(dn_uuid = %request.uuid, "heartbeat from unregistered datanode");
            self.metrics.record_hb_processing_failed();
            return Vec::new();
        }

        // Step 2: liveness + layout.
        let now = self.clock.now_millis();
        if let Ok((from, to)) = self.health.on_heartbeat(self.table, request.uuid, now) {
            if let Some(event) = RegistryEvent::for_health_transition(request.uuid, from, to) {
                self.bridge.emit(event);
            }
        }

        let scm_layout = LayoutInfo {
            software_layout_version: self.scm_layout.software_layout_version(),
            metadata_layout_version: self.scm_layout.metadata_layout_version(),
        };
        if let Ok(mut record) = self.table.get(request.uuid) {
            let finalize_command = ReportRouter::route_layout_report(
                &mut record,
                request.layout,
                scm_layout,
                self.scm_context,
            );
            let _ = self.table.update(record);
            if let Some(command) = finalize_command {
                self.command_queue.add(request.uuid, command.clone());
                self.metrics.record_command_enqueued(&command.command_type.to_string());
                self.bridge.emit(RegistryEvent::DatanodeCommand {
                    dn_uuid: request.uuid,
                    command,
                });
            }
        }

        // Step 3: operational-state reconciliation.
        self.reconcile_operational_state(&request);

        // Step 4: capture summary, then drain, under (conceptually) the
        // registry write lock; `NodeRegistry::process_heartbeat` is the
        // caller that actually holds that lock for this pair.
        let summary = self.command_queue.summary(request.uuid);
        let commands = self.command_queue.drain(request.uuid);

        // Step 5: ingest the command-queue report, if present.
        if let Some(dn_reported) = request.command_queue_report {
            if let Ok(mut record) = self.table.get(request.uuid) {
                ReportRouter::route_command_queue_report(
                    &mut record,
                    dn_reported,
                    &summary,
                    self.bridge,
                );
                let _ = self.table.update(record);
            }
        }

        commands
    }

    /// §4.4 "Operational-state reconciliation". Resolves the tension
    /// between the leader path (SCM authoritative, corrective command
    /// enqueued, stored state untouched — §8 Testable Property 4, S4) and
    /// the follower path (DN authoritative, stored state overwritten, no
    /// command — Testable Property 5, S5). See `DESIGN.md` for why the
    /// stored-record overwrite is *not* also applied on the leader path.
    fn reconcile_operational_state(&self, request: &HeartbeatRequest) {
        let Ok(record) = self.table.get(request.uuid) else {
            return;
        };
        let scm_pair = (record.persisted_op_state, record.op_state_expiry_epoch_sec);
        let dn_pair = (request.reported_op_state, request.reported_op_state_expiry_epoch_sec);

        if scm_pair == dn_pair {
            return;
        }

        if self.scm_context.is_leader() {
            match self.scm_context.term_of_leader() {
                Some(term) => {
                    let command = SCMCommand {
                        command_type: CommandType::SetNodeOperationalStateCommand,
                        term,
                        payload: CommandPayload::SetNodeOperationalState {
                            op_state: scm_pair.0,
                            expiry_epoch_sec: scm_pair.1,
                        },
                    };
                    self.command_queue.add(request.uuid, command.clone());
                    self.metrics.record_command_enqueued(&command.command_type.to_string());
                    self.bridge.emit(RegistryEvent::DatanodeCommand {
                        dn_uuid: request.uuid,
                        command,
                    });
                }
                None => {
                    tracing::warn!(
                        dn_uuid = %request.uuid,
                        "lost leadership while stamping SetNodeOperationalStateCommand; skipping"
                    );
                }
            }
        } else {
            let mut record = record;
            record.persisted_op_state = dn_pair.0;
            record.op_state_expiry_epoch_sec = dn_pair.1;
            let _ = self.table.update(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::config::{HealthConfig, MetricsConfig};
    use crate::context::{StaticLayoutVersionManager, StaticScmContext};
    use crate::events::RecordingEventPublisher;
    use crate::identity::DatanodeIdentity;
    use crate::models::record::DatanodeRecord;
    use std::sync::Arc;

    fn health_config() -> HealthConfig {
        HealthConfig {
            stale_threshold_millis: 60_000,
            dead_threshold_millis: 300_000,
            scan_interval_millis: 30_000,
        }
    }

    struct Fixture {
        table: NodeTable,
        queue: CommandQueue,
        health: HealthStateMachine,
        bridge: EventBridge,
        layout: StaticLayoutVersionManager,
        metrics: RegistryMetrics,
        clock: Arc<FakeClock>,
        uuid: Uuid,
    }

    impl Fixture {
        fn new() -> Self {
            let table = NodeTable::new();
            let identity = DatanodeIdentity::new(Uuid::new_v4(), "dn1", "10.0.0.1");
            let uuid = identity.uuid;
            table.add(DatanodeRecord::new(identity, LayoutInfo::matched(3), 0)).unwrap();

            let clock = Arc::new(FakeClock::new(0));
            Self {
                table,
                queue: CommandQueue::new(),
                health: HealthStateMachine::new(health_config(), clock.clone()),
                bridge: EventBridge::new(Arc::new(RecordingEventPublisher::new())),
                layout: StaticLayoutVersionManager::new(3, 3),
                metrics: RegistryMetrics::new(&MetricsConfig { enabled: true }),
                clock,
                uuid,
            }
        }

        fn processor<'a>(&'a self, ctx: &'a dyn ScmContext) -> HeartbeatProcessor<'a> {
            HeartbeatProcessor {
                table: &self.table,
                command_queue: &self.queue,
                health: &self.health,
                bridge: &self.bridge,
                scm_context: ctx,
                scm_layout: &self.layout,
                clock: self.clock.as_ref(),
                metrics: &self.metrics,
            }
        }

        fn request(&self, op_state: OperationalState) -> HeartbeatRequest {
            HeartbeatRequest {
                uuid: self.uuid,
                layout: LayoutInfo::matched(3),
                reported_op_state: op_state,
                reported_op_state_expiry_epoch_sec: 0,
                command_queue_report: None,
            }
        }
    }

    #[test]
    fn unregistered_identity_returns_empty_and_is_harmless() {
        let fx = Fixture::new();
        let ctx = StaticScmContext::leader(1);
        let processor = fx.processor(&ctx);
        let mut request = fx.request(OperationalState::InService);
        request.uuid = Uuid::new_v4();

        assert!(processor.process(request).is_empty());
    }

    #[test]
    fn s4_leader_drift_enqueues_exactly_one_command_and_keeps_stored_state() {
        let fx = Fixture::new();
        let ctx = StaticScmContext::leader(9);
        let processor = fx.processor(&ctx);

        let commands = processor.process(fx.request(OperationalState::Decommissioning));
        assert_eq!(commands.len(), 1);
        match &commands[0].payload {
            CommandPayload::SetNodeOperationalState { op_state, expiry_epoch_sec } => {
                assert_eq!(*op_state, OperationalState::InService);
                assert_eq!(*expiry_epoch_sec, 0);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
        assert_eq!(commands[0].term, 9);

        let record = fx.table.get(fx.uuid).unwrap();
        assert_eq!(record.persisted_op_state, OperationalState::InService);
        assert_eq!(fx.queue.count_by_type(fx.uuid, CommandType::SetNodeOperationalStateCommand), 0);
    }

    #[test]
    fn s5_follower_drift_stores_dn_value_and_enqueues_nothing() {
        let fx = Fixture::new();
        let ctx = StaticScmContext::follower();
        let processor = fx.processor(&ctx);

        let commands = processor.process(fx.request(OperationalState::Decommissioning));
        assert!(commands.is_empty());

        let record = fx.table.get(fx.uuid).unwrap();
        assert_eq!(record.persisted_op_state, OperationalState::Decommissioning);
    }

    #[test]
    fn matching_state_enqueues_nothing() {
        let fx = Fixture::new();
        let ctx = StaticScmContext::leader(1);
        let processor = fx.processor(&ctx);

        let commands = processor.process(fx.request(OperationalState::InService));
        assert!(commands.is_empty());
    }

    #[test]
    fn post_call_queue_is_empty_per_invariant_3() {
        let fx = Fixture::new();
        fx.queue.add(
            fx.uuid,
            SCMCommand {
                command_type: CommandType::ReregisterCommand,
                term: 1,
                payload: CommandPayload::Opaque("pre-existing".to_string()),
            },
        );
        let ctx = StaticScmContext::leader(1);
        let processor = fx.processor(&ctx);
        let commands = processor.process(fx.request(OperationalState::InService));

        assert_eq!(commands.len(), 1);
        assert!(fx.queue.is_empty(fx.uuid));
    }

    #[test]
    fn heartbeat_updates_last_heartbeat_millis() {
        let fx = Fixture::new();
        fx.clock.set(4242);
        let ctx = StaticScmContext::leader(1);
        let processor = fx.processor(&ctx);
        processor.process(fx.request(OperationalState::InService));

        assert_eq!(fx.table.get(fx.uuid).unwrap().last_heartbeat_millis, 4242);
    }
}
