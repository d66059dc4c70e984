//! Validation rules for [`super::RegistryConfig`].

use super::RegistryConfig;
use crate::error::{Error, Result};

/// Validates a loaded configuration, returning the first violation found.
pub fn validate(config: &RegistryConfig) -> Result<()> {
    if config.health.stale_threshold_millis >= config.health.dead_threshold_millis {
        return Err(Error::Config(format!(
            "health.stale_threshold_millis ({}) must be less than health.dead_threshold_millis ({})",
            config.health.stale_threshold_millis, config.health.dead_threshold_millis
        )));
    }
    if config.health.scan_interval_millis == 0 {
        return Err(Error::Config(
            "health.scan_interval_millis must be greater than 0".to_string(),
        ));
    }
    if config.server.host.is_empty() {
        return Err(Error::Config("server.host cannot be empty".to_string()));
    }
    if config.server.port == 0 {
        return Err(Error::Config(
            "server.port must be greater than 0".to_string(),
        ));
    }
    if config.layout.pipelines_per_metadata_volume == 0 {
        return Err(Error::Config(
            "layout.pipelines_per_metadata_volume must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_defaults() {
        assert!(validate(&RegistryConfig::default()).is_ok());
    }

    #[test]
    fn rejects_zero_scan_interval() {
        let mut config = RegistryConfig::default();
        config.health.scan_interval_millis = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_zero_pipelines_per_volume() {
        let mut config = RegistryConfig::default();
        config.layout.pipelines_per_metadata_volume = 0;
        assert!(validate(&config).is_err());
    }
}
