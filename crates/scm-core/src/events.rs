//! Domain event emission and the `CommandForDatanode` subscription path
//! (§4.8 EventBridge).

use crate::models::command::SCMCommand;
use crate::models::record::HealthState;
use uuid::Uuid;

/// Events emitted by the registry onto the configured [`EventPublisher`].
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    NewNode(Uuid),
    NodeAddressUpdate(Uuid),
    NodeStale(Uuid),
    NodeDead(Uuid),
    NodeHealthy(Uuid),
    DatanodeCommand { dn_uuid: Uuid, command: SCMCommand },
    DatanodeCommandCountUpdated(Uuid),
}

impl RegistryEvent {
    /// The UUID this event concerns, for log correlation.
    pub fn dn_uuid(&self) -> Uuid {
        match self {
            RegistryEvent::NewNode(u)
            | RegistryEvent::NodeAddressUpdate(u)
            | RegistryEvent::NodeStale(u)
            | RegistryEvent::NodeDead(u)
            | RegistryEvent::NodeHealthy(u)
            | RegistryEvent::DatanodeCommandCountUpdated(u) => *u,
            RegistryEvent::DatanodeCommand { dn_uuid, .. } => *dn_uuid,
        }
    }

    /// Maps a health-state transition onto its corresponding event, if any
    /// (entering HEALTHY from any other state, STALE, or DEAD).
    pub fn for_health_transition(uuid: Uuid, from: HealthState, to: HealthState) -> Option<Self> {
        if from == to {
            return None;
        }
        match to {
            HealthState::Stale => Some(RegistryEvent::NodeStale(uuid)),
            HealthState::Dead => Some(RegistryEvent::NodeDead(uuid)),
            HealthState::Healthy => Some(RegistryEvent::NodeHealthy(uuid)),
            HealthState::HealthyReadonly => None,
        }
    }
}

/// A message delivered to the registry asking that a command be queued for
/// a datanode, consumed by [`EventBridge::handle_command_for_datanode`].
#[derive(Debug, Clone, PartialEq)]
pub struct CommandForDatanode {
    pub dn_uuid: Uuid,
    pub command: SCMCommand,
}

/// Generic event sink the core publishes onto (§6: `EventPublisher.fireEvent`).
pub trait EventPublisher: Send + Sync {
    fn fire_event(&self, event: RegistryEvent);
}

/// A publisher that writes every event to the `tracing` log, useful as a
/// default and in tests that only assert on log output.
#[derive(Debug, Default)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn fire_event(&self, event: RegistryEvent) {
        tracing::info!(dn_uuid = %event.dn_uuid(), event = ?event, "registry event");
    }
}

/// A publisher that just records events for test assertions.
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: std::sync::Mutex<Vec<RegistryEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything published so far, in order.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events.lock().expect("event log mutex poisoned").clone()
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn fire_event(&self, event: RegistryEvent) {
        self.events.lock().expect("event log mutex poisoned").push(event);
    }
}

/// Thin emitter mapping internal state changes onto an [`EventPublisher`],
/// and the `CommandForDatanode` subscriber half of the same component
/// (§4.8, §9 "event cycles": the subscriber only ever calls into
/// `CommandQueue::add`, never back into this emitter, so there is no
/// re-entrancy to guard against here).
pub struct EventBridge {
    publisher: std::sync::Arc<dyn EventPublisher>,
}

impl EventBridge {
    pub fn new(publisher: std::sync::Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    /// Emits `event` onto the configured publisher.
    pub fn emit(&self, event: RegistryEvent) {
        self.publisher.fire_event(event);
    }
}
