//! Per-datanode FIFO of pending outbound commands (§4.3 CommandQueue).
//!
//! Every operation here is documented by `spec.md` as running "under the
//! registry's write lock"; this type provides no locking of its own beyond
//! what `DashMap` needs for its internal shards; `NodeRegistry` is
//! responsible for the summary+drain atomicity required by Testable
//! Property 3.

use crate::models::command::{CommandType, SCMCommand};
use dashmap::DashMap;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// A command outbox keyed by destination datanode UUID.
#[derive(Default)]
pub struct CommandQueue {
    queues: DashMap<Uuid, VecDeque<SCMCommand>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `command` to `uuid`'s outbox (§4.3 `add`).
    pub fn add(&self, uuid: Uuid, command: SCMCommand) {
        self.queues.entry(uuid).or_default().push_back(command);
    }

    /// Atomically removes and returns every queued command for `uuid`, in
    /// insertion order (§4.3 `drain`; §9 Open Question 1: this is the
    /// drain, not the peek, half of the split).
    pub fn drain(&self, uuid: Uuid) -> Vec<SCMCommand> {
        self.queues
            .get_mut(&uuid)
            .map(|mut queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Non-destructive snapshot of pending counts by command type, captured
    /// before drain during heartbeat processing (§4.3 `summary`; §9 Open
    /// Question 1: this is the peek half).
    pub fn summary(&self, uuid: Uuid) -> HashMap<CommandType, usize> {
        let mut counts = HashMap::new();
        if let Some(queue) = self.queues.get(&uuid) {
            for entry in queue.iter() {
                *counts.entry(entry.command_type).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Pending count of a single command type for `uuid` (§4.3 `countByType`).
    pub fn count_by_type(&self, uuid: Uuid, command_type: CommandType) -> usize {
        self.queues
            .get(&uuid)
            .map(|queue| queue.iter().filter(|c| c.command_type == command_type).count())
            .unwrap_or(0)
    }

    /// Total pending commands for `uuid`, across all types.
    pub fn len(&self, uuid: Uuid) -> usize {
        self.queues.get(&uuid).map(|queue| queue.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, uuid: Uuid) -> bool {
        self.len(uuid) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::command::CommandPayload;

    fn command(command_type: CommandType) -> SCMCommand {
        SCMCommand {
            command_type,
            term: 1,
            payload: CommandPayload::Opaque("test".to_string()),
        }
    }

    #[test]
    fn drain_returns_insertion_order_and_empties_queue() {
        let queue = CommandQueue::new();
        let uuid = Uuid::new_v4();
        queue.add(uuid, command(CommandType::ReregisterCommand));
        queue.add(uuid, command(CommandType::ClosePipelineCommand));

        let drained = queue.drain(uuid);
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].command_type, CommandType::ReregisterCommand);
        assert_eq!(drained[1].command_type, CommandType::ClosePipelineCommand);
        assert!(queue.is_empty(uuid));
    }

    #[test]
    fn summary_counts_by_type_without_draining() {
        let queue = CommandQueue::new();
        let uuid = Uuid::new_v4();
        queue.add(uuid, command(CommandType::DeleteBlocksCommand));
        queue.add(uuid, command(CommandType::DeleteBlocksCommand));
        queue.add(uuid, command(CommandType::ReregisterCommand));

        let summary = queue.summary(uuid);
        assert_eq!(summary.get(&CommandType::DeleteBlocksCommand), Some(&2));
        assert_eq!(summary.get(&CommandType::ReregisterCommand), Some(&1));
        assert_eq!(queue.len(uuid), 3, "summary must not drain");
    }

    #[test]
    fn count_by_type_matches_summary() {
        let queue = CommandQueue::new();
        let uuid = Uuid::new_v4();
        queue.add(uuid, command(CommandType::ReplicateContainerCommand));
        assert_eq!(queue.count_by_type(uuid, CommandType::ReplicateContainerCommand), 1);
        assert_eq!(queue.count_by_type(uuid, CommandType::ReregisterCommand), 0);
    }

    #[test]
    fn unknown_uuid_reads_as_empty() {
        let queue = CommandQueue::new();
        assert!(queue.drain(Uuid::new_v4()).is_empty());
        assert!(queue.summary(Uuid::new_v4()).is_empty());
    }
}
