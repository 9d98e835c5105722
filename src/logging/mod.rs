//! Diagnostic logging to disk.
//!
//! The terminal belongs to the UI, so `tracing` output goes to a daily file
//! `qubert-tui_<date>.log` in the configured log directory (default:
//! `~/.local/share/qubert-tui/logs/`). `RUST_LOG` overrides the configured level.

use crate::config::{expand_home, LoggingConfig};
use anyhow::{anyhow, Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Path of today's log file.
pub fn log_file_path(config: &LoggingConfig) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    expand_home(&config.log_dir).join(format!("qubert-tui_{}.log", date))
}

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. No-op when logging is disabled.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let path = log_file_path(config);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

    tracing::info!("Logging to {}", path.display());
    Ok(())
}
