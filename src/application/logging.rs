//! # Logging
//!
//! Installs the global `tracing` subscriber: stderr for the operator and an
//! optional plain-text session log that starts empty on every run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::config::LoggingConfig;
use crate::strings::logs;

/// Set up logging. Keep the returned guard alive until exit so the file
/// writer gets flushed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.as_str()));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let (dir, file_name) = split_log_path(Path::new(path));
            prepare_log_file(&dir, &file_name)?;

            let file_appender = tracing_appender::rolling::never(&dir, &file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    tracing::info!("{}", logs::session_start(&timestamp));

    Ok(guard)
}

/// Directory and file name of the session log. A bare file name lives in `.`.
fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session.log".to_string());
    (dir, file_name)
}

/// Create the log directory and clear the previous session's log.
fn prepare_log_file(dir: &Path, file_name: &str) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }

    let log_path = dir.join(file_name);
    if log_path.exists() {
        let _ = fs::remove_file(&log_path);
    }
    Ok(())
}
