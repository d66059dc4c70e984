//! Routes node (storage), layout, and command-queue reports onto a
//! datanode record, updating derived fields (§4.6).

use crate::context::ScmContext;
use crate::events::{EventBridge, RegistryEvent};
use crate::models::command::{CommandPayload, CommandType, SCMCommand};
use crate::models::layout::LayoutInfo;
use crate::models::record::DatanodeRecord;
use crate::models::storage::StorageReport;
use std::collections::HashMap;

/// Router for the three report kinds named in §4.6. Every method is a free
/// associated function operating on a `&mut DatanodeRecord`; callers
/// (`Registrar`, `HeartbeatProcessor`, `NodeRegistry`) are responsible for
/// writing the mutated record back through `NodeTable::update` under the
/// registry lock.
pub struct ReportRouter;

impl ReportRouter {
    /// Replaces the record's storage and metadata storage lists wholesale
    /// and recomputes the derived healthy/meta volume counts (§4.6 "Node
    /// (storage) report").
    pub fn route_node_report(
        record: &mut DatanodeRecord,
        storage_reports: Vec<StorageReport>,
        meta_storage_reports: Vec<StorageReport>,
    ) {
        record.healthy_volume_count = storage_reports.iter().filter(|r| r.healthy).count();
        record.meta_volume_count = meta_storage_reports.len();
        record.storage_reports = storage_reports;
        record.meta_storage_reports = meta_storage_reports;
    }

    /// Updates `(softwareLayoutVersion, metadataLayoutVersion)` on the
    /// record. Logs (does not reject) a datanode whose software layout
    /// version has somehow exceeded the SCM's own, and returns a
    /// `FinalizeNewLayoutVersionCommand` when the cluster has crossed its
    /// finalization checkpoint and the datanode's metadata layout version
    /// still lags the SCM's (§4.6 "Layout report"; §9 Open Question 3:
    /// "admit but do not finalize").
    pub fn route_layout_report(
        record: &mut DatanodeRecord,
        dn_layout: LayoutInfo,
        scm_layout: LayoutInfo,
        scm_context: &dyn ScmContext,
    ) -> Option<SCMCommand> {
        record.layout = dn_layout;

        if dn_layout.software_layout_version > scm_layout.software_layout_version {
            tracing::error!(
                dn_uuid = %record.identity.uuid,
                dn_slv = dn_layout.software_layout_version,
                scm_slv = scm_layout.software_layout_version,
                "datanode software layout version exceeds SCM's; this datanode should never have been admitted"
            );
        }

        if scm_context.finalization_checkpoint_crossed()
            && dn_layout.metadata_layout_version < scm_layout.metadata_layout_version
        {
            let term = scm_context.term_of_leader()?;
            return Some(SCMCommand {
                command_type: CommandType::FinalizeNewLayoutVersionCommand,
                term,
                payload: CommandPayload::FinalizeNewLayoutVersion,
            });
        }

        None
    }

    /// Merges the datanode-reported per-type pending counts with `summary`
    /// (the about-to-be-sent counts captured earlier in the same heartbeat)
    /// and stores the combined view on the record, emitting
    /// `DATANODE_COMMAND_COUNT_UPDATED` (§4.6 "Command-queue report").
    ///
    /// The merge keeps whichever count is larger per type: the DN's report
    /// reflects what it had queued at send time, while `summary` reflects
    /// what the SCM is about to hand it in the same round-trip, so the
    /// larger of the two is the freshest lower bound on what the DN will
    /// actually hold once this heartbeat's response is applied.
    pub fn route_command_queue_report(
        record: &mut DatanodeRecord,
        dn_reported: HashMap<CommandType, i64>,
        summary: &HashMap<CommandType, usize>,
        bridge: &EventBridge,
    ) {
        let mut merged = dn_reported;
        for (command_type, count) in summary {
            let count = *count as i64;
            merged
                .entry(*command_type)
                .and_modify(|existing| *existing = (*existing).max(count))
                .or_insert(count);
        }
        record.command_counts_from_dn = merged;
        bridge.emit(RegistryEvent::DatanodeCommandCountUpdated(record.identity.uuid));
    }
}
