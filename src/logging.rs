//! Tracing configuration and log routing.
//!
//! Console logs go to stderr with a compact formatter, leaving stdout to the rendered study
//! material. A second layer appends to `STUDYPACK_LOG_FILE`, or `logs/studypack.log` when that
//! is unset, through a non‑blocking writer so long generation runs never stall on disk I/O.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_PATH: &str = "logs/studypack.log";

/// Configure tracing subscribers for the console and the log file.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Falls back to console-only logging when the log file cannot be opened.
/// - Keeps the non‑blocking writer guard alive for the process lifetime.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let path = resolve_log_path(std::env::var("STUDYPACK_LOG_FILE").ok());
    match open_file_writer(&path) {
        Ok(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            registry.init();
        }
    }
}

/// Pick the log file path from an optional override.
fn resolve_log_path(configured: Option<String>) -> PathBuf {
    configured
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH))
}

/// Open `path` for appending, creating parent directories, and wrap it in a non‑blocking writer.
fn open_file_writer(path: &Path) -> std::io::Result<NonBlocking> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Ok(non_blocking)
}
