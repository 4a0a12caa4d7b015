//! File logging for the TUI. The terminal belongs to ratatui, so every
//! `tracing` event is appended to a log file instead of stdout.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Environment variable holding the filter directives, e.g. `voicecoach=debug`
pub const LOG_ENV: &str = "VOICECOACH_LOG";

const DEFAULT_FILTER: &str = "info";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Filter from `VOICECOACH_LOG`, falling back to `info` when unset or invalid
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber appending to `path`.
///
/// Returns an error when the file cannot be opened; a subscriber that is
/// already installed is left in place.
pub fn init(path: &Path) -> io::Result<()> {
    let file = open_log(path)?;
    let layer = fmt::layer()
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(Mutex::new(file));

    if tracing_subscriber::registry()
        .with(env_filter())
        .with(layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already installed");
    }
    tracing::info!(log = %path.display(), "logging initialised");
    Ok(())
}
