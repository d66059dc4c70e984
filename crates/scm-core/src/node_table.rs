//! Keyed datanode store with UUID and address secondary indexes (§4.1).

use crate::error::{Error, Result};
use crate::models::record::{DatanodeRecord, HealthState, OperationalState};
use dashmap::{DashMap, DashSet};
use std::collections::HashSet;
use uuid::Uuid;

/// Maps datanode identity to its full record, plus a secondary address
/// index. Both maps are `dashmap::DashMap`/`DashSet` (§5: "fine-grained
/// concurrent structures for the identity-indexed primary map and the
/// address secondary index"); callers that need cross-structure atomicity
/// (e.g. the Registrar's address-swap) hold the registry write lock around
/// the sequence of calls.
#[derive(Default)]
pub struct NodeTable {
    records: DashMap<Uuid, DatanodeRecord>,
    address_index: DashMap<String, DashSet<Uuid>>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record`, failing with [`Error::AlreadyExists`] if its UUID
    /// is already present. Updates both address-index entries atomically
    /// with respect to this call.
    pub fn add(&self, record: DatanodeRecord) -> Result<()> {
        let uuid = record.identity.uuid;
        if self.records.contains_key(&uuid) {
            return Err(Error::AlreadyExists(uuid));
        }
        self.index_address(&record.identity.host_name, uuid);
        self.index_address(&record.identity.ip_address, uuid);
        self.records.insert(uuid, record);
        Ok(())
    }

    /// Looks up a record by UUID, returning a clone (callers mutate via
    /// [`NodeTable::update`]).
    pub fn get(&self, uuid: Uuid) -> Result<DatanodeRecord> {
        self.records
            .get(&uuid)
            .map(|entry| entry.value().clone())
            .ok_or(Error::NotFound(uuid))
    }

    /// Replaces the stored record for `record.identity.uuid`, rebuilding the
    /// address index if either address string changed.
    pub fn update(&self, record: DatanodeRecord) -> Result<()> {
        let uuid = record.identity.uuid;
        let old = self
            .records
            .get(&uuid)
            .map(|entry| entry.value().clone())
            .ok_or(Error::NotFound(uuid))?;

        if old.identity.host_name != record.identity.host_name
            || old.identity.ip_address != record.identity.ip_address
        {
            self.deindex_address(&old.identity.host_name, uuid);
            self.deindex_address(&old.identity.ip_address, uuid);
            self.index_address(&record.identity.host_name, uuid);
            self.index_address(&record.identity.ip_address, uuid);
        }

        self.records.insert(uuid, record);
        Ok(())
    }

    /// Snapshot of records matching the (optional) operational-state and
    /// health wildcards. `None` on either axis matches anything.
    pub fn list_by_status(
        &self,
        op_state: Option<OperationalState>,
        health: Option<HealthState>,
    ) -> Vec<DatanodeRecord> {
        self.records
            .iter()
            .filter(|entry| Self::matches(entry.value(), op_state, health))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Count of records matching the wildcards. May not sum to `self.total()`
    /// across partitions under concurrent mutation; that is an accepted
    /// snapshot-drift outcome, not an error (§4.1, §8 invariant 7).
    pub fn count(&self, op_state: Option<OperationalState>, health: Option<HealthState>) -> usize {
        self.records
            .iter()
            .filter(|entry| Self::matches(entry.value(), op_state, health))
            .count()
    }

    /// Total number of records currently stored.
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// UUIDs currently indexed under `addr`.
    pub fn lookup_by_address(&self, addr: &str) -> HashSet<Uuid> {
        self.address_index
            .get(addr)
            .map(|set| set.iter().map(|entry| *entry).collect())
            .unwrap_or_default()
    }

    fn matches(
        record: &DatanodeRecord,
        op_state: Option<OperationalState>,
        health: Option<HealthState>,
    ) -> bool {
        op_state.map_or(true, |want| record.persisted_op_state == want)
            && health.map_or(true, |want| record.health == want)
    }

    fn index_address(&self, addr: &str, uuid: Uuid) {
        self.address_index
            .entry(addr.to_string())
            .or_default()
            .insert(uuid);
    }

    fn deindex_address(&self, addr: &str, uuid: Uuid) {
        if let Some(set) = self.address_index.get(addr) {
            set.remove(&uuid);
            if set.is_empty() {
                drop(set);
                self.address_index.remove(addr);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DatanodeIdentity;
    use crate::models::layout::LayoutInfo;

    fn record(uuid: Uuid, host: &str, ip: &str) -> DatanodeRecord {
        DatanodeRecord::new(DatanodeIdentity::new(uuid, host, ip), LayoutInfo::matched(1), 0)
    }

    #[test]
    fn add_rejects_duplicate_uuid() {
        let table = NodeTable::new();
        let uuid = Uuid::new_v4();
        table.add(record(uuid, "dn1", "10.0.0.1")).unwrap();
        let err = table.add(record(uuid, "dn2", "10.0.0.2")).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(u) if u == uuid));
    }

    #[test]
    fn address_index_reflects_both_addresses() {
        let table = NodeTable::new();
        let uuid = Uuid::new_v4();
        table.add(record(uuid, "dn1", "10.0.0.1")).unwrap();
        assert_eq!(table.lookup_by_address("dn1"), HashSet::from([uuid]));
        assert_eq!(table.lookup_by_address("10.0.0.1"), HashSet::from([uuid]));
    }

    #[test]
    fn update_rebuilds_address_index_on_rename() {
        let table = NodeTable::new();
        let uuid = Uuid::new_v4();
        table.add(record(uuid, "dn1", "10.0.0.1")).unwrap();

        let renamed = record(uuid, "dn1b", "10.0.0.2");
        table.update(renamed).unwrap();

        assert!(table.lookup_by_address("dn1").is_empty());
        assert!(table.lookup_by_address("10.0.0.1").is_empty());
        assert_eq!(table.lookup_by_address("dn1b"), HashSet::from([uuid]));
        assert_eq!(table.lookup_by_address("10.0.0.2"), HashSet::from([uuid]));
    }

    #[test]
    fn count_respects_wildcards() {
        let table = NodeTable::new();
        table.add(record(Uuid::new_v4(), "dn1", "10.0.0.1")).unwrap();
        table.add(record(Uuid::new_v4(), "dn2", "10.0.0.2")).unwrap();
        assert_eq!(table.count(None, None), 2);
        assert_eq!(table.count(Some(OperationalState::InService), None), 2);
        assert_eq!(table.count(None, Some(HealthState::Dead)), 0);
        assert!(table.count(None, None) <= table.total());
    }
}
