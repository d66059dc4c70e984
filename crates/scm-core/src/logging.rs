//! Structured logging for the datanode registry core.
//!
//! Built on the `tracing` ecosystem: a level filter driven by
//! [`crate::config::LoggingConfig`], with `json`/`compact`/pretty output
//! formats and optional rolling daily file output alongside stdout.

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initializes the global `tracing` subscriber from `config`.
///
/// This installs a process-wide subscriber and must be called at most once;
/// callers embedding the core (`scm-server`, `scm-cli`) should call it from
/// `main` before constructing a `NodeRegistry`.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::Config(format!("invalid log level '{}': {e}", config.level)))?;

    match config.format.as_str() {
        "json" => {
            if let Some(ref file_path) = config.file {
                let appender = create_file_appender(file_path)?;
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        fmt::layer()
                            .json()
                            .with_current_span(true)
                            .with_target(true)
                            .with_writer(appender),
                    )
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json().with_current_span(true).with_target(true))
                    .init();
            }
        }
        "compact" => {
            if let Some(ref file_path) = config.file {
                let appender = create_file_appender(file_path)?;
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().compact().with_target(false).with_writer(appender))
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().compact().with_target(false))
                    .init();
            }
        }
        _ => {
            if let Some(ref file_path) = config.file {
                let appender = create_file_appender(file_path)?;
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty().with_target(true).with_writer(appender))
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty().with_target(true))
                    .init();
            }
        }
    }

    tracing::info!(
        level = %config.level,
        format = %config.format,
        file_output = config.file.is_some(),
        "tracing initialized"
    );

    Ok(())
}

/// Initializes tracing with defaults suitable for tests and examples.
pub fn init_default_tracing() -> Result<()> {
    init_tracing(&LoggingConfig {
        level: "info".to_string(),
        format: "pretty".to_string(),
        file: None,
    })
}

fn create_file_appender(file_path: &str) -> Result<tracing_appender::rolling::RollingFileAppender> {
    let path = Path::new(file_path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("scm-core.log");
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));

    Ok(tracing_appender::rolling::daily(dir, file_name))
}
