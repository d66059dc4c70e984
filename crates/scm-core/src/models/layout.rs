//! On-disk layout version reporting (§3 DATA MODEL, §4.6 ReportRouter).

use serde::{Deserialize, Serialize};

/// A datanode's self-reported layout version pair, carried on registration
/// and on every heartbeat/layout report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    /// Software layout version: the on-disk format the running datanode
    /// binary understands.
    pub software_layout_version: i64,
    /// Metadata layout version: the schema version of data actually
    /// persisted to disk, which may lag `software_layout_version` until an
    /// upgrade finalizes.
    pub metadata_layout_version: i64,
}

impl LayoutInfo {
    /// Builds a layout pair where software and metadata versions match,
    /// the common case outside of an in-progress upgrade.
    pub fn matched(version: i64) -> Self {
        Self {
            software_layout_version: version,
            metadata_layout_version: version,
        }
    }
}
