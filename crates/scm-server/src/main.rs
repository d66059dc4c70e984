//! SCM registry HTTP server.
//!
//! Thin RPC surface over [`scm_core::registry::NodeRegistry`]: datanode
//! `register`/`heartbeat` RPCs, plus a read-only admin surface.

mod api;
mod error;
mod handlers;
mod server;

use anyhow::Result;
use clap::Parser;
use scm_core::config::RegistryConfig;
use scm_core::logging::init_tracing;
use std::path::PathBuf;
use tracing::info;

/// SCM registry HTTP server.
#[derive(Parser, Debug)]
#[command(name = "scm-server")]
#[command(about = "Datanode registry HTTP server")]
#[command(version)]
struct Args {
    /// Configuration file path.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to.
    #[arg(long)]
    host: Option<String>,

    /// Server port to bind to.
    #[arg(short, long)]
    port: Option<u16>,

    /// This SCM instance's identifier.
    #[arg(long, default_value = "scm-1")]
    scm_id: String,

    /// Cluster identifier returned from `register`/`getVersion`.
    #[arg(long, default_value = "cluster-1")]
    cluster_id: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

/// Loads configuration from file or environment, falling back to defaults.
fn load_configuration(args: &Args) -> Result<RegistryConfig> {
    if let Some(config_path) = &args.config {
        info!("loading configuration from: {}", config_path.display());
        Ok(RegistryConfig::from_file(config_path.clone())?)
    } else {
        Ok(RegistryConfig::from_env().unwrap_or_else(|_| {
            info!("using default configuration");
            RegistryConfig::default()
        }))
    }
}

/// Applies command line argument overrides to configuration.
fn apply_cli_overrides(config: &mut RegistryConfig, args: &Args) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(log_level) = &args.log_level {
        config.logging.level = log_level.clone();
    }
}

async fn initialize_app(args: &Args) -> Result<RegistryConfig> {
    let mut config = load_configuration(args)?;
    apply_cli_overrides(&mut config, args);
    config.validate()?;

    #[cfg(not(test))]
    init_tracing(&config.logging)?;

    info!("starting scm-server...");
    info!(
        "configuration: server={}:{}, scm_id={}, cluster_id={}",
        config.server.host, config.server.port, args.scm_id, args.cluster_id
    );

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = initialize_app(&args).await?;
    server::run(config, args.scm_id.clone(), args.cluster_id.clone()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_default_values() {
        let args = Args::try_parse_from(["scm-server"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert_eq!(args.scm_id, "scm-1");
        assert_eq!(args.cluster_id, "cluster-1");
    }

    #[test]
    fn args_with_host_and_port() {
        let args =
            Args::try_parse_from(["scm-server", "--host", "127.0.0.1", "--port", "8080"]).unwrap();
        assert_eq!(args.host, Some("127.0.0.1".to_string()));
        assert_eq!(args.port, Some(8080));
    }

    #[test]
    fn args_invalid_port_rejected() {
        let result = Args::try_parse_from(["scm-server", "--port", "70000"]);
        assert!(result.is_err());
    }

    #[test]
    fn apply_cli_overrides_only_touches_supplied_fields() {
        let mut config = RegistryConfig::default();
        let original_port = config.server.port;

        let args = Args::try_parse_from(["scm-server", "--host", "10.0.0.5"]).unwrap();
        apply_cli_overrides(&mut config, &args);

        assert_eq!(config.server.host, "10.0.0.5");
        assert_eq!(config.server.port, original_port);
    }

    #[tokio::test]
    async fn initialize_app_with_defaults_is_valid() {
        let args = Args::try_parse_from(["scm-server"]).unwrap();
        let config = initialize_app(&args).await.unwrap();
        assert_eq!(config.server.port, RegistryConfig::default().server.port);
    }

    #[test]
    fn load_configuration_reads_from_file_when_given() {
        let file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        RegistryConfig::default().save_to_file(file.path()).unwrap();

        let args = Args::try_parse_from(["scm-server", "--config", file.path().to_str().unwrap()])
            .unwrap();
        let config = load_configuration(&args).unwrap();
        assert_eq!(config.server.port, RegistryConfig::default().server.port);
    }
}
