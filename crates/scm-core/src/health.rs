//! Per-datanode health state machine and its background scanner (§4.2).

use crate::clock::Clock;
use crate::config::HealthConfig;
use crate::error::Result;
use crate::events::{EventBridge, RegistryEvent};
use crate::models::record::HealthState;
use crate::node_table::NodeTable;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Drives every tracked datanode through `HEALTHY -> STALE -> DEAD` by
/// comparing heartbeat recency against configured thresholds. Transitions
/// out of `HEALTHY_READONLY` are driven by heartbeat content, not this
/// scanner (§4.2).
pub struct HealthStateMachine {
    config: HealthConfig,
    clock: Arc<dyn Clock>,
    paused: AtomicBool,
    skipped_checks: AtomicU64,
}

impl HealthStateMachine {
    /// Builds a new state machine. Panics if `stale_threshold_millis` is not
    /// strictly less than `dead_threshold_millis` (§4.2: "thresholds are
    /// strictly ordered"); this is a configuration-validation concern and
    /// `RegistryConfig::validate` should be called before construction in
    /// production to surface it earlier.
    pub fn new(config: HealthConfig, clock: Arc<dyn Clock>) -> Self {
        assert!(
            config.stale_threshold_millis < config.dead_threshold_millis,
            "stale_threshold_millis must be less than dead_threshold_millis"
        );
        Self {
            config,
            clock,
            paused: AtomicBool::new(false),
            skipped_checks: AtomicU64::new(0),
        }
    }

    /// Pauses the scanner (test hook, §4.2). While paused, [`Self::tick`]
    /// still increments [`Self::skipped_checks`] instead of transitioning
    /// any records.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resumes the scanner after [`Self::pause`].
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Number of ticks skipped while paused, visible for tests (§4.2).
    pub fn skipped_checks(&self) -> u64 {
        self.skipped_checks.load(Ordering::SeqCst)
    }

    /// Runs one scan over every record in `table`, demoting nodes whose age
    /// has crossed a threshold and publishing the corresponding event via
    /// `bridge`. A paused scanner only increments `skipped_checks`.
    pub fn tick(&self, table: &NodeTable, bridge: &EventBridge) {
        if self.is_paused() {
            self.skipped_checks.fetch_add(1, Ordering::SeqCst);
            return;
        }

        let now = self.clock.now_millis();
        for mut record in table.list_by_status(None, None) {
            let uuid = record.identity.uuid;
            let age = now.saturating_sub(record.last_heartbeat_millis);
            let from = record.health;

            let to = match from {
                HealthState::Healthy if age > self.config.stale_threshold_millis => {
                    HealthState::Stale
                }
                HealthState::Stale if age > self.config.dead_threshold_millis => HealthState::Dead,
                other => other,
            };

            if to != from {
                record.health = to;
                if table.update(record).is_ok() {
                    if let Some(event) = RegistryEvent::for_health_transition(uuid, from, to) {
                        bridge.emit(event);
                    }
                }
            }
        }
    }

    /// Records a heartbeat: any prior health state re-enters `HEALTHY`
    /// (§4.2: "any state -> HEALTHY when a heartbeat is received"). Returns
    /// the transition so the caller can decide whether to fire a recovery
    /// event (a DEAD node returning fires the same `NodeHealthy` event as
    /// any other recovery; §4.2 edge case).
    pub fn on_heartbeat(
        &self,
        table: &NodeTable,
        uuid: Uuid,
        now: u64,
    ) -> Result<(HealthState, HealthState)> {
        let mut record = table.get(uuid)?;
        let from = record.health;
        record.health = HealthState::Healthy;
        record.last_heartbeat_millis = now;
        table.update(record)?;
        Ok((from, HealthState::Healthy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::events::RecordingEventPublisher;
    use crate::identity::DatanodeIdentity;
    use crate::models::layout::LayoutInfo;
    use crate::models::record::DatanodeRecord;

    fn config() -> HealthConfig {
        HealthConfig {
            stale_threshold_millis: 60_000,
            dead_threshold_millis: 300_000,
            scan_interval_millis: 30_000,
        }
    }

    fn insert(table: &NodeTable, host: &str, last_heartbeat_millis: u64) -> Uuid {
        let uuid = Uuid::new_v4();
        let identity = DatanodeIdentity::new(uuid, host, "10.0.0.1");
        let mut record = DatanodeRecord::new(identity, LayoutInfo::matched(1), last_heartbeat_millis);
        record.last_heartbeat_millis = last_heartbeat_millis;
        table.add(record).unwrap();
        uuid
    }

    #[test]
    fn scanner_expiry_matches_s6() {
        let table = NodeTable::new();
        let publisher = Arc::new(RecordingEventPublisher::new());
        let bridge = EventBridge::new(publisher.clone());
        let clock = Arc::new(FakeClock::new(0));

        let u1 = insert(&table, "dn1", 0);
        clock.set(10_000);
        let u2 = insert(&table, "dn2", clock.now_millis().saturating_sub(200_000));

        let sm = HealthStateMachine::new(config(), clock.clone());
        sm.tick(&table, &bridge);

        assert_eq!(table.get(u1).unwrap().health, HealthState::Healthy);
        assert_eq!(table.get(u2).unwrap().health, HealthState::Stale);

        clock.set(400_000);
        sm.tick(&table, &bridge);
        assert_eq!(table.get(u2).unwrap().health, HealthState::Dead);

        let events = publisher.events();
        let stale_idx = events
            .iter()
            .position(|e| *e == RegistryEvent::NodeStale(u2))
            .expect("NodeStale emitted");
        let dead_idx = events
            .iter()
            .position(|e| *e == RegistryEvent::NodeDead(u2))
            .expect("NodeDead emitted");
        assert!(stale_idx < dead_idx);
    }

    #[test]
    fn dead_node_stays_dead_without_heartbeat() {
        let table = NodeTable::new();
        let clock = Arc::new(FakeClock::new(0));
        let publisher = Arc::new(RecordingEventPublisher::new());
        let bridge = EventBridge::new(publisher);
        let sm = HealthStateMachine::new(config(), clock.clone());

        let uuid = insert(&table, "dn1", 0);
        clock.set(1_000_000);
        sm.tick(&table, &bridge);
        assert_eq!(table.get(uuid).unwrap().health, HealthState::Dead);

        clock.advance(config().scan_interval_millis);
        sm.tick(&table, &bridge);
        assert_eq!(table.get(uuid).unwrap().health, HealthState::Dead);
    }

    #[test]
    fn paused_scanner_increments_skipped_checks_only() {
        let table = NodeTable::new();
        let clock = Arc::new(FakeClock::new(0));
        let publisher = Arc::new(RecordingEventPublisher::new());
        let bridge = EventBridge::new(publisher);
        let sm = HealthStateMachine::new(config(), clock.clone());

        insert(&table, "dn1", 0);
        clock.set(1_000_000);
        sm.pause();
        sm.tick(&table, &bridge);
        assert_eq!(sm.skipped_checks(), 1);

        let records = table.list_by_status(None, None);
        assert_eq!(records[0].health, HealthState::Healthy, "paused scanner must not transition");
    }

    #[test]
    fn heartbeat_recovers_dead_node_to_healthy() {
        let table = NodeTable::new();
        let clock = Arc::new(FakeClock::new(0));
        let sm = HealthStateMachine::new(config(), clock.clone());
        let uuid = insert(&table, "dn1", 0);

        let mut record = table.get(uuid).unwrap();
        record.health = HealthState::Dead;
        table.update(record).unwrap();

        let (from, to) = sm.on_heartbeat(&table, uuid, 42).unwrap();
        assert_eq!(from, HealthState::Dead);
        assert_eq!(to, HealthState::Healthy);
        assert_eq!(table.get(uuid).unwrap().last_heartbeat_millis, 42);
    }
}
