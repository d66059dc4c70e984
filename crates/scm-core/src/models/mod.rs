//! Data model for the datanode registry (§3 DATA MODEL).

pub mod command;
pub mod layout;
pub mod record;
pub mod storage;

pub use command::{CommandType, SCMCommand};
pub use layout::LayoutInfo;
pub use record::{DatanodeRecord, HealthState, NodeStatus, OperationalState};
pub use storage::{StorageReport, StorageType};
