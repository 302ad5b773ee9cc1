//! Diagnostics and logging setup for Golden Crown Sales.
//!
//! Provides:
//! - **About info**: crate version, platform, architecture
//! - **Logging init**: console + daily rolling file subscriber used by
//!   embedding applications before constructing a [`SalesSession`](crate::session::SalesSession).
//! - **Log rotation helpers**: prunes stale rolling log files on startup.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of log files to retain.
pub const MAX_LOG_FILES: usize = 10;

/// File name prefix used by the daily rolling appender.
const LOG_FILE_PREFIX: &str = "sales";

static LOGGING_INIT: Once = Once::new();

// ---------------------------------------------------------------------------
// About info
// ---------------------------------------------------------------------------

/// Returns build metadata for display on an About screen.
pub fn about_info() -> Value {
    json!({
        "version": env!("CARGO_PKG_VERSION"),
        "platform": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "rustVersion": env!("CARGO_PKG_RUST_VERSION"),
    })
}

// ---------------------------------------------------------------------------
// Logging setup
// ---------------------------------------------------------------------------

/// Returns the log directory under the application data directory.
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// Initialize structured logging (console + daily rolling file).
///
/// Honors `RUST_LOG`; defaults to `info` globally with `debug` for this
/// crate. Safe to call more than once — only the first call installs the
/// subscriber, subsequent calls are ignored.
pub fn init_logging(data_dir: &Path) {
    let log_dir = log_dir(data_dir);
    LOGGING_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,golden_crown_sales=debug"));

        // Prune old log files before setting up the appender
        prune_old_logs(&log_dir);
        fs::create_dir_all(&log_dir).ok();

        let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true);
        let console_layer = fmt::layer().with_target(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        // Keep the guard alive for the lifetime of the app — dropping it
        // flushes logs. We leak it intentionally since the process runs
        // until exit.
        std::mem::forget(guard);
    });
}

// ---------------------------------------------------------------------------
// Log rotation
// ---------------------------------------------------------------------------

/// Prune old log files, keeping only the most recent `MAX_LOG_FILES`.
pub fn prune_old_logs(log_dir: &Path) {
    if !log_dir.exists() {
        return;
    }

    // The appender writes `{LOG_FILE_PREFIX}.{date}`; a plain
    // `{LOG_FILE_PREFIX}.log` matches the same prefix.
    let prefix = format!("{LOG_FILE_PREFIX}.");
    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
    if let Ok(entries) = fs::read_dir(log_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if name.starts_with(&prefix) {
                        let modified = entry
                            .metadata()
                            .ok()
                            .and_then(|m| m.modified().ok())
                            .unwrap_or(std::time::UNIX_EPOCH);
                        log_files.push((path, modified));
                    }
                }
            }
        }
    }

    // Sort newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    // Remove files beyond the limit
    for (path, _) in log_files.iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to prune log file {}: {e}", path.display());
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
