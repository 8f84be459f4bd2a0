use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, TelemetryConfig};

/// Initialize logging.
///
/// `RUST_LOG` takes precedence over the configured level. Without a log file,
/// output goes to stderr; stdout carries the runner's JSON and nothing else.
///
/// # Errors
/// Returns error if the log file or its directory can't be created
pub fn init(config: &TelemetryConfig) -> Result<()> {
    let filter = build_filter(&config.level);

    let Some(log_path) = config.log_path.as_deref() else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return Ok(());
    };

    let expanded_path = expand_log_path(log_path)?;

    if let Some(parent) = expanded_path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&expanded_path)
        .context("failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_target(false)
        .with_ansi(false)
        .init();

    tracing::debug!(path = %expanded_path.display(), "logging to file");

    Ok(())
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn expand_log_path(path: &str) -> Result<PathBuf> {
    Config::expand_path(path)
}
