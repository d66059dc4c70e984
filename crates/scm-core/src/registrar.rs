//! First-contact registration and address-change detection (§4.5).

use crate::context::LayoutVersionManager;
use crate::events::{EventBridge, RegistryEvent};
use crate::identity::DatanodeIdentity;
use crate::models::layout::LayoutInfo;
use crate::models::record::DatanodeRecord;
use crate::models::storage::StorageReport;
use crate::node_table::NodeTable;
use crate::report_router::ReportRouter;
use crate::topology::{NetworkTopology, NodeResolver};
use uuid::Uuid;

/// `register` request payload (§4.5 input, §6 response shapes).
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub uuid: Uuid,
    pub host_name: String,
    pub ip_address: String,
    pub node_report: Vec<StorageReport>,
    pub layout: LayoutInfo,
}

/// `register` response error code (§6: "shape-stable for wire compatibility").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterErrorCode {
    Success,
    ErrorNodeNotPermitted,
}

/// `register` response (§4.5 step 6, §6).
#[derive(Debug, Clone)]
pub struct RegisterResponse {
    pub error_code: RegisterErrorCode,
    pub identity: DatanodeIdentity,
    pub cluster_id: String,
}

/// Registrar: layout gate, topology/index bookkeeping, and `NEW_NODE` /
/// `NODE_ADDRESS_UPDATE` event emission.
pub struct Registrar<'a> {
    pub table: &'a NodeTable,
    pub topology: &'a dyn NetworkTopology,
    pub resolver: &'a dyn NodeResolver,
    pub layout_manager: &'a dyn LayoutVersionManager,
    pub bridge: &'a EventBridge,
    pub use_hostname: bool,
    pub cluster_id: String,
    pub now_millis: u64,
}

impl<'a> Registrar<'a> {
    /// Handles a registration request end-to-end (§4.5 steps 1-6).
    pub fn register(&self, request: RegisterRequest) -> RegisterResponse {
        // Step 1: layout gate. Reject without any state mutation.
        if request.layout.software_layout_version != self.layout_manager.software_layout_version() {
            return RegisterResponse {
                error_code: RegisterErrorCode::ErrorNodeNotPermitted,
                identity: DatanodeIdentity::new(request.uuid, request.host_name, request.ip_address),
                cluster_id: self.cluster_id.clone(),
            };
        }

        let identity = DatanodeIdentity::new(
            request.uuid,
            request.host_name.clone(),
            request.ip_address.clone(),
        );
        // Step 2/3: derive the resolver-input address and resolve rack location.
        let selected_address = identity.selected_address(self.use_hostname).to_string();
        let network_location = self.resolver.resolve(&selected_address);

        match self.table.get(request.uuid) {
            Err(_) => self.register_new(identity, network_location, request),
            Ok(existing) => self.register_existing(existing, identity, network_location, request),
        }

        RegisterResponse {
            error_code: RegisterErrorCode::Success,
            identity: DatanodeIdentity::new(request.uuid, request.host_name, request.ip_address),
            cluster_id: self.cluster_id.clone(),
        }
    }

    fn register_new(
        &self,
        identity: DatanodeIdentity,
        network_location: Option<String>,
        request: RegisterRequest,
    ) {
        let mut record = DatanodeRecord::new(identity, request.layout, self.now_millis);
        record.network_location = network_location;

        // Topology add must happen before the table insert so that
        // "topology.contains(record)" holds immediately after a successful
        // registration (§8 invariant 2).
        let parent_assigned = self.topology.add(&record);
        assert!(
            parent_assigned,
            "topology parent must be non-null after add (§4.5 step 4 invariant check)"
        );

        let uuid = record.identity.uuid;
        let host = record.identity.host_name.clone();
        let ip = record.identity.ip_address.clone();

        ReportRouter::route_node_report(&mut record, request.node_report, Vec::new());
        self.table
            .add(record)
            .expect("uuid was absent under the same lock that performed this check");

        debug_assert!(!host.is_empty() || !ip.is_empty());
        self.bridge.emit(RegistryEvent::NewNode(uuid));
    }

    fn register_existing(
        &self,
        existing: DatanodeRecord,
        new_identity: DatanodeIdentity,
        network_location: Option<String>,
        request: RegisterRequest,
    ) {
        let address_changed = existing.identity.host_name != new_identity.host_name
            || existing.identity.ip_address != new_identity.ip_address;

        if !address_changed {
            return;
        }

        let uuid = existing.identity.uuid;
        let mut record = existing;
        record.identity = new_identity;
        record.network_location = network_location;
        record.layout = request.layout;
        ReportRouter::route_node_report(&mut record, request.node_report, Vec::new());

        self.topology.update(&record);
        self.table
            .update(record)
            .expect("uuid was present under the same lock that performed this check");

        self.bridge.emit(RegistryEvent::NodeAddressUpdate(uuid));
    }
}
