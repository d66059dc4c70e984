//! Error types for the datanode registry core.

use thiserror::Error;
use uuid::Uuid;

/// Registry core error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Identity not present in the registry. Expected during normal operation
    /// (e.g. an unregistered datanode heartbeats); callers on the heartbeat
    /// path must not treat this as fatal.
    #[error("datanode {0} not found")]
    NotFound(Uuid),

    /// Duplicate registration of an already-known UUID.
    #[error("datanode {0} already exists")]
    AlreadyExists(Uuid),

    /// This SCM is not (or is no longer) leader; command stamping was skipped.
    #[error("not leader")]
    NotLeader,

    /// Pipeline lookup by ID found nothing. Peer-list computation treats this
    /// as benign and skips the missing pipeline.
    #[error("pipeline {0} not found")]
    PipelineNotFound(String),

    /// Datanode's software layout version does not match the SCM's; the
    /// registration is rejected, not retried.
    #[error("layout mismatch: datanode slv={datanode_slv} scm slv={scm_slv}")]
    LayoutMismatch { datanode_slv: i64, scm_slv: i64 },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] toml::de::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Registry core result type.
pub type Result<T> = std::result::Result<T, Error>;
