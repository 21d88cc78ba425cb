//! Logging configuration for outland-reports.
//!
//! Report output goes to stdout, so logs default to stderr at `warn` level.
//! `RUST_LOG` overrides the filter; `--log-file` redirects logs to a file.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initializes logging to a file.
///
/// Location: `path` if given, otherwise [`get_log_path`]. Falls back to
/// stderr logging when the file cannot be created.
pub fn init_file_logging(path: Option<&Path>) {
    let log_path = path.map(Path::to_path_buf).unwrap_or_else(get_log_path);

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            init_stderr_logging();
            return;
        }
    }

    // Truncate on each run to avoid unbounded growth
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            init_stderr_logging();
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

/// Initializes logging to stderr.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the default path for the log file.
///
/// Uses the XDG state directory on Linux (`~/.local/state/outland-reports/outland.log`),
/// or falls back to the config directory on other platforms.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("outland-reports").join("outland.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("outland-reports").join("outland.log");
    }

    std::env::temp_dir().join("outland.log")
}
