//! Configuration management for the datanode registry core.
//!
//! TOML-based configuration with environment variable overrides, following
//! the `config` crate's builder pattern.

pub mod validation;

use crate::error::{Error, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for configuration overrides, e.g.
/// `SCM_HEALTH_STALE_THRESHOLD_MILLIS`.
const ENV_PREFIX: &str = "SCM";

/// Top-level registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Health state machine thresholds and scanner cadence.
    pub health: HealthConfig,
    /// Registration and pipeline-limit derivation knobs.
    pub layout: LayoutConfig,
    /// RPC surface bind address, consumed by `scm-server`.
    pub server: ServerConfig,
    /// Structured logging configuration.
    pub logging: LoggingConfig,
    /// In-process metrics configuration.
    pub metrics: MetricsConfig,
}

/// HealthStateMachine configuration (§4.2 / §6 configuration keys).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Age, in milliseconds, past which a HEALTHY node becomes STALE.
    pub stale_threshold_millis: u64,
    /// Age, in milliseconds, past which a STALE node becomes DEAD.
    pub dead_threshold_millis: u64,
    /// Scanner tick interval, in milliseconds.
    pub scan_interval_millis: u64,
}

/// Registration / pipeline-limit configuration (§6 configuration keys).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Whether the Registrar should prefer hostname over IP address when
    /// deriving the datanode's network identity.
    pub use_hostname: bool,
    /// Default pipeline-limit multiplier applied per metadata volume.
    pub pipelines_per_metadata_volume: u32,
    /// Explicit per-datanode pipeline cap override; `0` means "derive from
    /// volumes" (see `StatsView::pipeline_limit`).
    pub datanode_pipeline_limit: u32,
}

/// `scm-server` bind configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

/// Structured logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` level filter, e.g. `"info"`, `"debug"`.
    pub level: String,
    /// Output format: `"json"`, `"compact"`, or anything else for pretty.
    pub format: String,
    /// Optional file path for rolling daily file output, in addition to stdout.
    pub file: Option<String>,
}

/// In-process metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether `RegistryMetrics` records observations at all.
    pub enabled: bool,
}

impl RegistryConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file with environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let builder = ConfigBuilder::builder()
            .add_source(File::with_name(
                path.as_ref().to_str().unwrap_or("config"),
            ))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("_"));

        let config = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build configuration: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::Config(format!("failed to deserialize configuration: {e}")))
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Result<Self> {
        let builder = ConfigBuilder::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("_"));

        let config = builder.build().map_err(|e| {
            Error::Config(format!("failed to build configuration from environment: {e}"))
        })?;

        config
            .try_deserialize()
            .map_err(|e| Error::Config(format!("failed to deserialize configuration: {e}")))
    }

    /// Saves configuration to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize configuration: {e}")))?;

        std::fs::write(path, toml_string).map_err(Error::Io)
    }

    /// Validates the configuration, enforcing the ordering and non-empty
    /// constraints implied by §6/§4.2 of the specification.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            health: HealthConfig {
                stale_threshold_millis: 90_000,
                dead_threshold_millis: 300_000,
                scan_interval_millis: 30_000,
            },
            layout: LayoutConfig {
                use_hostname: false,
                pipelines_per_metadata_volume: 2,
                datanode_pipeline_limit: 0,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 9861,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                file: None,
            },
            metrics: MetricsConfig { enabled: true },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        assert!(RegistryConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut config = RegistryConfig::default();
        config.health.stale_threshold_millis = 500_000;
        config.health.dead_threshold_millis = 100_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_host() {
        let mut config = RegistryConfig::default();
        config.server.host.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_file() {
        let file = NamedTempFile::with_suffix(".toml").expect("tempfile");
        let config = RegistryConfig::default();
        config.save_to_file(file.path()).expect("save");

        let contents = std::fs::read_to_string(file.path()).expect("read back");
        let reloaded: RegistryConfig = toml::from_str(&contents).expect("parse");
        assert_eq!(reloaded.health.stale_threshold_millis, config.health.stale_threshold_millis);
        assert_eq!(reloaded.server.port, config.server.port);
    }
}
