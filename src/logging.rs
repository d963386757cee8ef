//! Logging setup for the foreground CLI and the detached monitor.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;

const TIME_FORMAT: &str = "%H:%M:%S%.3f";

fn timer() -> ChronoLocal {
    ChronoLocal::new(TIME_FORMAT.to_string())
}

/// Start/stop commands: warnings and errors to stderr, status lines are printed separately
pub fn init_foreground() {
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_timer(timer())
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Background monitor: stdio is detached, so append to the log file.
/// Keep the returned guard alive until the process exits.
pub fn init_background(log_file: &Path) -> Result<WorkerGuard> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_timer(timer())
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(guard)
}
