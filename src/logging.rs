//! Opt-in diagnostic log written to a file in the temp directory.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const DEBUG_LOG_FILE: &str = "comment-checker-debug.log";

pub fn debug_log_path() -> PathBuf {
    std::env::temp_dir().join(DEBUG_LOG_FILE)
}

/// Install the file subscriber when `enabled`; otherwise leave tracing without
/// a subscriber so nothing is emitted. Returns whether a subscriber was installed.
pub fn init(enabled: bool) -> bool {
    if !enabled {
        return false;
    }

    let path = debug_log_path();
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("comment-checker: cannot open debug log {}: {}", path.display(), e);
            return false;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("comment_checker_hooks=debug,comment_checker_hook=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok()
}
