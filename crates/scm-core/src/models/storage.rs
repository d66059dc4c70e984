//! Per-volume storage reports (§3 DATA MODEL, §4.6 ReportRouter).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Storage medium backing a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
pub enum StorageType {
    Disk,
    Ssd,
    Archive,
    RamDisk,
    Nvme,
}

/// A single volume's capacity report, as carried in `storageReports` and
/// `metaStorageReports` on [`crate::models::DatanodeRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageReport {
    /// Path or identifier of the volume, as reported by the datanode.
    pub storage_location: String,
    /// Storage medium.
    pub storage_type: StorageType,
    /// Total capacity, in bytes.
    pub capacity: u64,
    /// Bytes used.
    pub used: u64,
    /// Bytes remaining.
    pub remaining: u64,
    /// Whether the volume is healthy (not failed).
    pub healthy: bool,
}

impl StorageReport {
    /// Utilization ratio `used / capacity`, used by `StatsView::mostOrLeastUsed`.
    /// Returns `0.0` for a zero-capacity volume rather than dividing by zero.
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.used as f64 / self.capacity as f64
        }
    }
}
