//! Datanode Registry and Command Dispatch Core
//!
//! The authoritative in-memory view of every datanode (DN) in a Storage
//! Container Manager (SCM) cluster: identity, health, operational state,
//! layout version, storage reports, and container/pipeline membership.
//! Drives each DN through a health state machine, mediates a per-DN
//! command outbox drained on heartbeat, reconciles operational-state drift
//! between leader and follower SCM, and emits domain events.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use scm_core::clock::FakeClock;
//! use scm_core::config::RegistryConfig;
//! use scm_core::context::{InMemoryPipelineManager, StaticLayoutVersionManager, StaticScmContext};
//! use scm_core::events::RecordingEventPublisher;
//! use scm_core::registry::{NodeRegistry, RegistryDeps};
//! use scm_core::topology::{InMemoryTopology, NullResolver};
//!
//! let deps = RegistryDeps {
//!     clock: Arc::new(FakeClock::new(0)),
//!     topology: Arc::new(InMemoryTopology::new()),
//!     resolver: Arc::new(NullResolver),
//!     layout_manager: Arc::new(StaticLayoutVersionManager::new(3, 3)),
//!     scm_context: Arc::new(StaticScmContext::leader(1)),
//!     pipeline_manager: Arc::new(InMemoryPipelineManager::new()),
//!     event_publisher: Arc::new(RecordingEventPublisher::new()),
//! };
//! let registry = NodeRegistry::init(RegistryConfig::default(), deps, "scm-1".into(), "cluster-1".into())
//!     .expect("valid default config");
//! ```
//!
//! # Architecture
//!
//! - [`node_table`] — keyed datanode store with address secondary index (§4.1).
//! - [`health`] — per-DN health state machine and scanner (§4.2).
//! - [`command_queue`] — per-DN FIFO outbox (§4.3).
//! - [`heartbeat`] — heartbeat entry point (§4.4).
//! - [`registrar`] — first-contact registration (§4.5).
//! - [`report_router`] — node/layout/command-queue report routing (§4.6).
//! - [`stats`] — read-only aggregate statistics (§4.7).
//! - [`events`] — domain event emission (§4.8).
//! - [`registry`] — `NodeRegistry`, the top-level facade.

pub mod clock;
pub mod command_queue;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod health;
pub mod heartbeat;
pub mod identity;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod node_table;
pub mod registrar;
pub mod registry;
pub mod report_router;
pub mod stats;
pub mod topology;

pub use error::{Error, Result};

/// Commonly used types for embedding binaries (`scm-server`, `scm-cli`).
pub mod prelude {
    pub use crate::clock::{Clock, FakeClock, SystemClock};
    pub use crate::command_queue::CommandQueue;
    pub use crate::config::RegistryConfig;
    pub use crate::context::{
        InMemoryPipelineManager, LayoutVersionManager, PipelineManager, PipelineMembers,
        ScmContext, StaticLayoutVersionManager, StaticScmContext,
    };
    pub use crate::error::{Error, Result};
    pub use crate::events::{
        CommandForDatanode, EventBridge, EventPublisher, RecordingEventPublisher, RegistryEvent,
        TracingEventPublisher,
    };
    pub use crate::health::HealthStateMachine;
    pub use crate::heartbeat::{HeartbeatProcessor, HeartbeatRequest};
    pub use crate::identity::DatanodeIdentity;
    pub use crate::models::{
        CommandType, DatanodeRecord, HealthState, LayoutInfo, NodeStatus, OperationalState,
        SCMCommand, StorageReport, StorageType,
    };
    pub use crate::node_table::NodeTable;
    pub use crate::registrar::{RegisterErrorCode, RegisterRequest, RegisterResponse, Registrar};
    pub use crate::registry::{NodeRegistry, RegistryDeps, VersionInfo};
    pub use crate::report_router::ReportRouter;
    pub use crate::stats::{StatsView, UsageTotals};
    pub use crate::topology::{InMemoryTopology, NetworkTopology, NodeResolver, NullResolver};
}
