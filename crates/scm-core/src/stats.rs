//! Read-only aggregate statistics, topology lookups, and pipeline-limit
//! derivations (§4.7). Every method here takes a `&NodeTable` snapshot
//! (copy-on-read, §9 design notes) and never mutates state.

use crate::context::PipelineManager;
use crate::identity::DatanodeIdentity;
use crate::models::record::{DatanodeRecord, HealthState, OperationalState};
use crate::node_table::NodeTable;
use std::collections::HashSet;
use uuid::Uuid;

/// Aggregate `(capacity, used, remaining)` totals (§4.7 `clusterStat`, and
/// the "Observable management surface" Disk/SSD category breakdown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsageTotals {
    pub capacity: u64,
    pub used: u64,
    pub remaining: u64,
}

pub struct StatsView<'a> {
    pub table: &'a NodeTable,
    pub pipelines: &'a dyn PipelineManager,
    pub pipelines_per_metadata_volume: u32,
    pub datanode_pipeline_limit_override: u32,
}

impl<'a> StatsView<'a> {
    /// Aggregates usage across records whose health is still
    /// capacity-contributing (HEALTHY, HEALTHY_READONLY, STALE; §4.7).
    pub fn cluster_stat(&self) -> UsageTotals {
        let mut totals = UsageTotals::default();
        for record in self.table.list_by_status(None, None) {
            if !record.health.counts_toward_cluster_stat() {
                continue;
            }
            let (capacity, used, remaining) = record.storage_totals();
            totals.capacity += capacity;
            totals.used += used;
            totals.remaining += remaining;
        }
        totals
    }

    /// Usage totals for a single datanode, or `None` if it is not present
    /// (§4.7 `perNodeStat`).
    pub fn per_node_stat(&self, identity: Uuid) -> Option<UsageTotals> {
        let record = self.table.get(identity).ok()?;
        let (capacity, used, remaining) = record.storage_totals();
        Some(UsageTotals { capacity, used, remaining })
    }

    /// In-service, healthy records sorted by utilization ratio, ties broken
    /// by UUID for determinism (§4.7 `mostOrLeastUsed`).
    pub fn most_or_least_used(&self, most_used: bool) -> Vec<DatanodeRecord> {
        let mut records: Vec<DatanodeRecord> = self
            .table
            .list_by_status(Some(OperationalState::InService), Some(HealthState::Healthy))
            .into_iter()
            .collect();

        records.sort_by(|a, b| {
            let ratio_a = utilization_ratio(a);
            let ratio_b = utilization_ratio(b);
            let ordering = ratio_a
                .partial_cmp(&ratio_b)
                .unwrap_or(std::cmp::Ordering::Equal);
            let ordering = if most_used { ordering.reverse() } else { ordering };
            ordering.then_with(|| a.identity.uuid.cmp(&b.identity.uuid))
        });
        records
    }

    /// Per-datanode pipeline cap: the configured heavy-node override if
    /// positive, else `pipelinesPerMetadataVolume * metaVolumeCount` when
    /// the node has at least one healthy volume, else `0` (§4.7
    /// `pipelineLimit`).
    pub fn pipeline_limit(&self, identity: Uuid) -> u32 {
        if self.datanode_pipeline_limit_override > 0 {
            return self.datanode_pipeline_limit_override;
        }
        let Ok(record) = self.table.get(identity) else {
            return 0;
        };
        if record.healthy_volume_count == 0 {
            return 0;
        }
        self.pipelines_per_metadata_volume * record.meta_volume_count as u32
    }

    /// Minimum `pipeline_limit` across `identities`. Undefined (returns
    /// `None`) on an empty list (§4.7 `minPipelineLimit`).
    pub fn min_pipeline_limit(&self, identities: &[Uuid]) -> Option<u32> {
        identities.iter().map(|id| self.pipeline_limit(*id)).min()
    }

    /// Minimum healthy-volume count across `identities`; missing datanodes
    /// are skipped. Undefined (returns `None`) on an empty effective list
    /// (§4.7 `minHealthyVolumeNum`).
    pub fn min_healthy_volume_num(&self, identities: &[Uuid]) -> Option<usize> {
        identities
            .iter()
            .filter_map(|id| self.table.get(*id).ok())
            .map(|record| record.healthy_volume_count)
            .min()
    }

    /// Union of every pipeline member this datanode participates in, minus
    /// the datanode itself; pipelines the `PipelineManager` cannot find are
    /// skipped, not errored (§4.7 `peerList`, §7 `PipelineNotFound`).
    pub fn peer_list(&self, identity: Uuid) -> HashSet<Uuid> {
        let Ok(record) = self.table.get(identity) else {
            return HashSet::new();
        };
        let mut peers = HashSet::new();
        for pipeline_id in &record.pipeline_set {
            if let Some(pipeline) = self.pipelines.get_pipeline(*pipeline_id) {
                peers.extend(pipeline.members.iter().copied());
            }
        }
        peers.remove(&identity);
        peers
    }

    /// `(opState, health)` counts across every tracked datanode, for the
    /// "per-state counts" admin surface (§6).
    pub fn per_state_counts(&self) -> std::collections::HashMap<(OperationalState, HealthState), usize> {
        let mut counts = std::collections::HashMap::new();
        for record in self.table.list_by_status(None, None) {
            *counts.entry((record.persisted_op_state, record.health)).or_insert(0) += 1;
        }
        counts
    }

    /// `hostName -> {opState, health}` view for the admin surface's
    /// "per-node status" listing (§6).
    pub fn per_node_status(&self) -> Vec<(DatanodeIdentity, OperationalState, HealthState)> {
        self.table
            .list_by_status(None, None)
            .into_iter()
            .map(|r| (r.identity, r.persisted_op_state, r.health))
            .collect()
    }
}

fn utilization_ratio(record: &DatanodeRecord) -> f64 {
    let (capacity, used, _) = record.storage_totals();
    if capacity == 0 {
        0.0
    } else {
        used as f64 / capacity as f64
    }
}
