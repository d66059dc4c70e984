//! Rack-awareness ports: topology membership and address-to-rack resolution
//! (§6 consumed interfaces: `NetworkTopology`, `NodeResolver`).

use crate::models::record::DatanodeRecord;
use dashmap::DashSet;
use uuid::Uuid;

/// Resolves a network address to a rack path. A `None` result means
/// unresolved, which the Registrar treats as allowed (§4.5 step 3).
pub trait NodeResolver: Send + Sync {
    fn resolve(&self, address: &str) -> Option<String>;
}

/// A resolver that never assigns a rack, for deployments or tests with no
/// topology script configured.
#[derive(Debug, Default)]
pub struct NullResolver;

impl NodeResolver for NullResolver {
    fn resolve(&self, _address: &str) -> Option<String> {
        None
    }
}

/// Tracks which datanodes are known to the topology, keyed by UUID (§3:
/// `topology.contains(record)` invariant; §9: the registry lock guards
/// cross-structure consistency, so this structure only needs to be
/// internally consistent, not externally synchronized with NodeTable).
pub trait NetworkTopology: Send + Sync {
    /// Adds `record` to the topology, assigning it a parent rack node.
    /// Returns `true` if a non-null parent was assigned.
    fn add(&self, record: &DatanodeRecord) -> bool;

    /// Re-applies topology membership after an address or rack change.
    fn update(&self, record: &DatanodeRecord) -> bool;

    /// Whether `uuid` is currently tracked by the topology.
    fn contains(&self, uuid: Uuid) -> bool;

    /// Removes `uuid` from the topology.
    fn remove(&self, uuid: Uuid);
}

/// A simple in-memory topology: membership is a set, and "parent assigned"
/// degenerates to "a rack path was resolved, or the default rack is used".
/// Real clusters back this with an actual rack tree; nothing in this core's
/// scope requires traversing one, only containment and parent-non-null.
#[derive(Debug, Default)]
pub struct InMemoryTopology {
    members: DashSet<Uuid>,
}

impl InMemoryTopology {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NetworkTopology for InMemoryTopology {
    fn add(&self, record: &DatanodeRecord) -> bool {
        self.members.insert(record.identity.uuid);
        true
    }

    fn update(&self, record: &DatanodeRecord) -> bool {
        self.members.insert(record.identity.uuid);
        true
    }

    fn contains(&self, uuid: Uuid) -> bool {
        self.members.contains(&uuid)
    }

    fn remove(&self, uuid: Uuid) {
        self.members.remove(&uuid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DatanodeIdentity;
    use crate::models::layout::LayoutInfo;

    #[test]
    fn add_then_contains() {
        let topology = InMemoryTopology::new();
        let identity = DatanodeIdentity::new(Uuid::new_v4(), "dn1", "10.0.0.1");
        let record = DatanodeRecord::new(identity.clone(), LayoutInfo::matched(1), 0);
        assert!(topology.add(&record));
        assert!(topology.contains(identity.uuid));
    }

    #[test]
    fn remove_clears_membership() {
        let topology = InMemoryTopology::new();
        let identity = DatanodeIdentity::new(Uuid::new_v4(), "dn1", "10.0.0.1");
        let record = DatanodeRecord::new(identity.clone(), LayoutInfo::matched(1), 0);
        topology.add(&record);
        topology.remove(identity.uuid);
        assert!(!topology.contains(identity.uuid));
    }
}
