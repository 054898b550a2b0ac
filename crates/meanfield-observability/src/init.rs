// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always; with `file-logging`, a timestamped run folder holding a combined
//! log file, keeping the most recent runs only.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;

#[cfg(feature = "file-logging")]
use std::path::{Path, PathBuf};

/// Build the filter for a base level plus per-crate debug flags
///
/// `RUST_LOG`, when set, replaces both.
pub fn build_filter(base_level: &str, debug_flags: &CrateDebugFlags) -> Result<EnvFilter> {
    if let Ok(directives) = std::env::var("RUST_LOG") {
        return EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid RUST_LOG filter '{}'", directives));
    }
    let directives = debug_flags.to_filter_string(base_level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter '{}'", directives))
}

/// Install a console subscriber
///
/// # Errors
/// Fails if the filter does not parse or a global subscriber is already installed.
pub fn init_logging(base_level: &str, debug_flags: &CrateDebugFlags) -> Result<()> {
    let filter = build_filter(base_level, debug_flags)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Keeps the file writer alive; logs are flushed when dropped
#[cfg(feature = "file-logging")]
pub struct LoggingGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
    log_dir: PathBuf,
}

#[cfg(feature = "file-logging")]
impl LoggingGuard {
    /// Folder of this run's log file
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Install console and file output
///
/// Creates:
/// ```text
/// ./logs/
///   └── run_20250101_120000/
///       └── meanfield.log
/// ```
///
/// # Arguments
/// * `log_dir` - Base directory for logs (default: `./logs`)
/// * `retention_runs` - Keep N most recent runs (default: 10)
#[cfg(feature = "file-logging")]
pub fn init_file_logging(
    base_level: &str,
    debug_flags: &CrateDebugFlags,
    log_dir: Option<PathBuf>,
    retention_runs: Option<usize>,
) -> Result<LoggingGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, Layer, Registry};

    let base_log_dir = log_dir.unwrap_or_else(|| PathBuf::from("./logs"));
    let run_folder = base_log_dir.join(format!(
        "run_{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
    prune_old_runs(&base_log_dir, retention_runs.unwrap_or(10))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&run_folder, "meanfield.log"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_filter(build_filter(base_level, debug_flags)?);
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_filter(build_filter(base_level, debug_flags)?);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(LoggingGuard {
        _file_guard: guard,
        log_dir: run_folder,
    })
}

/// Remove all but the `keep` most recent `run_*` folders; returns how many were removed
#[cfg(feature = "file-logging")]
pub fn prune_old_runs(base_log_dir: &Path, keep: usize) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let mut runs: Vec<PathBuf> = std::fs::read_dir(base_log_dir)
        .with_context(|| format!("Failed to list {}", base_log_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("run_"))
        })
        .collect();
    // Timestamped names sort oldest first
    runs.sort();

    let excess = runs.len().saturating_sub(keep);
    let mut removed = 0;
    for path in runs.iter().take(excess) {
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!(
                "Warning: Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }
    Ok(removed)
}
