//! Log output setup
//!
//! The terminal UI owns stdout and stderr, so interactive sessions log to a
//! file in the cache directory. One-shot runs log to stderr. Filtering follows
//! `RUST_LOG`, defaulting to `info`.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

/// Name of the log file inside the log directory
pub const LOG_FILE_NAME: &str = "pointcast.log";

/// Default log directory (`~/.cache/pointcast/` on Linux)
pub fn default_log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pointcast").map(|dirs| dirs.cache_dir().to_path_buf())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Opens (creating if needed) the log file in `dir` for appending
pub fn open_log_file(dir: &Path) -> std::io::Result<File> {
    fs::create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
}

/// Sends log events to `<dir>/pointcast.log`
///
/// Returns the path of the log file. Does nothing if a subscriber is
/// already installed.
pub fn init_file(dir: &Path) -> std::io::Result<PathBuf> {
    let file = open_log_file(dir)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(dir.join(LOG_FILE_NAME))
}

/// Sends log events to stderr
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}
