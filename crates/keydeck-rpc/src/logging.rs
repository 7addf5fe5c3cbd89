//! Logging setup for plugin binaries.
//!
//! The host discards a plugin's stderr, so logs also go to a timestamped file
//! in the temp directory, with a stable symlink pointing at the newest one.

use std::path::PathBuf;

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
#[must_use]
pub fn default_directive() -> String {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    format!("keydeck={default_level}")
}

/// Log file name for `name` started at the current local time.
#[must_use]
pub fn log_file_name(name: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("{name}-{timestamp}.log")
}

/// Install the global subscriber. Returns the path of the log file.
///
/// Call once, early in `main`. A second call leaves the first subscriber in place.
#[must_use]
pub fn init(name: &str) -> PathBuf {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive()));

    let temp_dir = std::env::temp_dir();
    let log_filename = log_file_name(name);
    let log_path = temp_dir.join(&log_filename);

    #[cfg(unix)]
    {
        let symlink_path = temp_dir.join(format!("{name}.log"));
        let _ = std::fs::remove_file(&symlink_path);
        let _ = std::os::unix::fs::symlink(&log_path, &symlink_path);
    }

    let file_appender = tracing_appender::rolling::never(&temp_dir, &log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The writer must outlive every task that logs.
    std::mem::forget(guard);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(filter)
        .try_init();

    log_path
}
