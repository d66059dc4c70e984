//! The datanode record itself: identity, operational/health state, layout,
//! storage reports, and container/pipeline membership (§3 DATA MODEL).

use crate::identity::DatanodeIdentity;
use crate::models::command::CommandType;
use crate::models::layout::LayoutInfo;
use crate::models::storage::StorageReport;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Administrator-visible operational state of a datanode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum OperationalState {
    InService,
    Decommissioning,
    Decommissioned,
    EnteringMaintenance,
    InMaintenance,
}

/// Liveness state derived from heartbeat recency, plus a read-only variant
/// entered during a rolling upgrade (§4.2 HealthStateMachine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum HealthState {
    Healthy,
    HealthyReadonly,
    Stale,
    Dead,
}

impl HealthState {
    /// Whether this state counts toward `StatsView::clusterStat`'s
    /// "still contributing capacity" set (§4.7: HEALTHY, HEALTHY_READONLY, STALE).
    pub fn counts_toward_cluster_stat(self) -> bool {
        matches!(self, HealthState::Healthy | HealthState::HealthyReadonly | HealthState::Stale)
    }
}

/// Derived view of a record's current operational and health state (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub operational_state: OperationalState,
    pub health: HealthState,
    pub op_state_expiry_epoch_sec: i64,
}

/// The authoritative in-memory record for one datanode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatanodeRecord {
    /// Stable identity (UUID plus current address pair).
    pub identity: DatanodeIdentity,
    /// Rack path resolved via the injected `NodeResolver`; `None` means
    /// unresolved, which is allowed (§4.5 step 3).
    pub network_location: Option<String>,
    /// Administrator-visible state as last persisted by the SCM.
    pub persisted_op_state: OperationalState,
    /// Epoch-second expiry of `persisted_op_state`; `0` means it never expires.
    pub op_state_expiry_epoch_sec: i64,
    /// Liveness, driven by the scanner and heartbeat reception.
    pub health: HealthState,
    /// Monotonic millis of the last accepted heartbeat.
    pub last_heartbeat_millis: u64,
    /// Software/metadata layout version pair.
    pub layout: LayoutInfo,
    /// Per-volume data storage reports.
    pub storage_reports: Vec<StorageReport>,
    /// Per-volume metadata storage reports.
    pub meta_storage_reports: Vec<StorageReport>,
    /// Last-reported per-type pending command counts, as seen by the DN
    /// itself. Absent entries query as `-1` (§3).
    pub command_counts_from_dn: HashMap<CommandType, i64>,
    /// Container IDs hosted by this datanode.
    pub container_set: HashSet<i64>,
    /// Pipeline IDs this datanode participates in.
    pub pipeline_set: HashSet<Uuid>,
    /// Cached count of healthy entries in `storage_reports` (§4.6).
    pub healthy_volume_count: usize,
    /// Cached `meta_storage_reports.len()` (§4.6).
    pub meta_volume_count: usize,
}

impl DatanodeRecord {
    /// Creates a freshly-registered record with empty reports and no
    /// container/pipeline membership.
    pub fn new(identity: DatanodeIdentity, layout: LayoutInfo, now_millis: u64) -> Self {
        Self {
            identity,
            network_location: None,
            persisted_op_state: OperationalState::InService,
            op_state_expiry_epoch_sec: 0,
            health: HealthState::Healthy,
            last_heartbeat_millis: now_millis,
            layout,
            storage_reports: Vec::new(),
            meta_storage_reports: Vec::new(),
            command_counts_from_dn: HashMap::new(),
            container_set: HashSet::new(),
            pipeline_set: HashSet::new(),
            healthy_volume_count: 0,
            meta_volume_count: 0,
        }
    }

    /// Derived `(opState, health, expiry)` view (§3).
    pub fn status(&self) -> NodeStatus {
        NodeStatus {
            operational_state: self.persisted_op_state,
            health: self.health,
            op_state_expiry_epoch_sec: self.op_state_expiry_epoch_sec,
        }
    }

    /// `commandCountsFromDN` lookup; absent entries read as `-1` (§3).
    pub fn command_count_from_dn(&self, command_type: CommandType) -> i64 {
        *self.command_counts_from_dn.get(&command_type).unwrap_or(&-1)
    }

    /// Total reported capacity/used/remaining across `storage_reports`.
    pub fn storage_totals(&self) -> (u64, u64, u64) {
        self.storage_reports.iter().fold((0, 0, 0), |(cap, used, rem), report| {
            (cap + report.capacity, used + report.used, rem + report.remaining)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::storage::StorageType;

    fn sample_identity() -> DatanodeIdentity {
        DatanodeIdentity::new(Uuid::new_v4(), "dn1", "10.0.0.1")
    }

    #[test]
    fn new_record_starts_healthy_in_service() {
        let record = DatanodeRecord::new(sample_identity(), LayoutInfo::matched(3), 1000);
        assert_eq!(record.health, HealthState::Healthy);
        assert_eq!(record.status().operational_state, OperationalState::InService);
        assert_eq!(record.last_heartbeat_millis, 1000);
    }

    #[test]
    fn missing_command_count_reads_as_negative_one() {
        let record = DatanodeRecord::new(sample_identity(), LayoutInfo::matched(3), 0);
        assert_eq!(
            record.command_count_from_dn(CommandType::ReplicateContainerCommand),
            -1
        );
    }

    #[test]
    fn storage_totals_sum_all_reports() {
        let mut record = DatanodeRecord::new(sample_identity(), LayoutInfo::matched(3), 0);
        record.storage_reports.push(StorageReport {
            storage_location: "/d0".to_string(),
            storage_type: StorageType::Disk,
            capacity: 1000,
            used: 100,
            remaining: 900,
            healthy: true,
        });
        record.storage_reports.push(StorageReport {
            storage_location: "/d1".to_string(),
            storage_type: StorageType::Ssd,
            capacity: 2000,
            used: 500,
            remaining: 1500,
            healthy: true,
        });
        assert_eq!(record.storage_totals(), (3000, 600, 2400));
    }
}
