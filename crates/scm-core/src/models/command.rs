//! Outbound SCM-to-datanode commands (§3 DATA MODEL, §4.3 CommandQueue).

use crate::models::record::OperationalState;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Discriminant for commands and command-count reports, used both as the
/// `SCMCommand.command_type` field and as the key space for
/// `commandCountsFromDN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum CommandType {
    SetNodeOperationalStateCommand,
    FinalizeNewLayoutVersionCommand,
    ClosePipelineCommand,
    DeleteBlocksCommand,
    ReplicateContainerCommand,
    ReregisterCommand,
}

/// A command queued for delivery to a datanode, returned in batch from
/// `processHeartbeat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SCMCommand {
    /// Command discriminant.
    pub command_type: CommandType,
    /// Leader term this command was stamped with, fencing stale commands
    /// issued by a since-deposed leader.
    pub term: u64,
    /// Command-specific payload.
    pub payload: CommandPayload,
}

/// Command-specific payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandPayload {
    /// Reasserts the SCM's authoritative operational state onto the DN.
    SetNodeOperationalState {
        op_state: OperationalState,
        expiry_epoch_sec: i64,
    },
    /// Tells the DN it is safe to finalize its on-disk layout upgrade.
    FinalizeNewLayoutVersion,
    /// Opaque payload for command types not modeled in detail here.
    Opaque(String),
}
