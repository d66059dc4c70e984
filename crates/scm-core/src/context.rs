//! Consumed ports the registry core relies on but does not own: leader/term
//! context, layout-version source, and pipeline lookups (§6 consumed
//! interfaces: `SCMContext`, `LayoutVersionManager`, `PipelineManager`).

use std::collections::HashSet;
use uuid::Uuid;

/// Leader-election/term context, consumed when stamping leader-only
/// commands (§4.4, §4.6). Command stamping is skipped, not retried, when
/// the term cannot be obtained (§7 `NotLeader`).
pub trait ScmContext: Send + Sync {
    /// Whether this SCM replica is currently leader.
    fn is_leader(&self) -> bool;

    /// The current leader term, if this replica is leader right now.
    /// `None` means the caller raced a leadership change and must skip the
    /// stamp silently (§4.4).
    fn term_of_leader(&self) -> Option<u64>;

    /// Whether the cluster has crossed the point where every datanode's
    /// metadata layout version is allowed to advance to match the software
    /// layout version (§4.6 layout report handling).
    fn finalization_checkpoint_crossed(&self) -> bool;
}

/// Fixed-term, always-leader or always-follower context for tests and for
/// single-node deployments that never lose leadership.
#[derive(Debug, Clone, Copy)]
pub struct StaticScmContext {
    leader: bool,
    term: u64,
    finalization_checkpoint_crossed: bool,
}

impl StaticScmContext {
    pub fn leader(term: u64) -> Self {
        Self {
            leader: true,
            term,
            finalization_checkpoint_crossed: false,
        }
    }

    pub fn follower() -> Self {
        Self {
            leader: false,
            term: 0,
            finalization_checkpoint_crossed: false,
        }
    }

    pub fn with_finalization_checkpoint_crossed(mut self, crossed: bool) -> Self {
        self.finalization_checkpoint_crossed = crossed;
        self
    }
}

impl ScmContext for StaticScmContext {
    fn is_leader(&self) -> bool {
        self.leader
    }

    fn term_of_leader(&self) -> Option<u64> {
        self.leader.then_some(self.term)
    }

    fn finalization_checkpoint_crossed(&self) -> bool {
        self.finalization_checkpoint_crossed
    }
}

/// Source of the SCM's own layout version, consulted by the Registrar's
/// layout gate (§4.5 step 1) and the ReportRouter's layout comparison
/// (§4.6).
pub trait LayoutVersionManager: Send + Sync {
    fn software_layout_version(&self) -> i64;
    fn metadata_layout_version(&self) -> i64;
}

/// A fixed layout version pair, for tests and simple deployments that do
/// not perform rolling layout upgrades.
#[derive(Debug, Clone, Copy)]
pub struct StaticLayoutVersionManager {
    software: i64,
    metadata: i64,
}

impl StaticLayoutVersionManager {
    pub fn new(software: i64, metadata: i64) -> Self {
        Self { software, metadata }
    }
}

impl LayoutVersionManager for StaticLayoutVersionManager {
    fn software_layout_version(&self) -> i64 {
        self.software
    }

    fn metadata_layout_version(&self) -> i64 {
        self.metadata
    }
}

/// A single pipeline's membership, as returned by [`PipelineManager`].
/// Placement/allocation policy lives entirely outside this core (§1 "Out of
/// scope"); this is only the membership shape needed for peer-list
/// computation (§4.7 `peerList`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineMembers {
    pub pipeline_id: Uuid,
    pub members: HashSet<Uuid>,
}

/// Peer-list/placement collaborator (§6 `PipelineManager.getPipeline(id)`).
pub trait PipelineManager: Send + Sync {
    /// Looks up a pipeline's membership by ID. `None` means
    /// [`crate::error::Error::PipelineNotFound`], which peer-list
    /// computation treats as benign and skips (§7).
    fn get_pipeline(&self, pipeline_id: Uuid) -> Option<PipelineMembers>;
}

/// An in-memory pipeline manager for tests and for deployments that have
/// not wired in a real placement service yet.
#[derive(Debug, Default)]
pub struct InMemoryPipelineManager {
    pipelines: std::sync::RwLock<std::collections::HashMap<Uuid, HashSet<Uuid>>>,
}

impl InMemoryPipelineManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a pipeline's membership, for test setup.
    pub fn set_pipeline(&self, pipeline_id: Uuid, members: HashSet<Uuid>) {
        self.pipelines
            .write()
            .expect("pipeline map mutex poisoned")
            .insert(pipeline_id, members);
    }
}

impl PipelineManager for InMemoryPipelineManager {
    fn get_pipeline(&self, pipeline_id: Uuid) -> Option<PipelineMembers> {
        self.pipelines
            .read()
            .expect("pipeline map mutex poisoned")
            .get(&pipeline_id)
            .map(|members| PipelineMembers {
                pipeline_id,
                members: members.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_context_leader_exposes_term() {
        let ctx = StaticScmContext::leader(7);
        assert!(ctx.is_leader());
        assert_eq!(ctx.term_of_leader(), Some(7));
    }

    #[test]
    fn static_context_follower_has_no_term() {
        let ctx = StaticScmContext::follower();
        assert!(!ctx.is_leader());
        assert_eq!(ctx.term_of_leader(), None);
    }

    #[test]
    fn in_memory_pipeline_manager_round_trips() {
        let mgr = InMemoryPipelineManager::new();
        let pipeline_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        mgr.set_pipeline(pipeline_id, HashSet::from([a, b]));

        let found = mgr.get_pipeline(pipeline_id).expect("pipeline present");
        assert_eq!(found.members, HashSet::from([a, b]));
        assert!(mgr.get_pipeline(Uuid::new_v4()).is_none());
    }
}
