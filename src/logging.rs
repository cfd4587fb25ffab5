// Conditional logging macros - only active in debug builds

use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

const LOG_DIR: &str = "nerdle";

/// `<local data dir>/nerdle/logs/nerdle-YYYYMMDD.log`
#[must_use]
pub fn default_log_path() -> Option<PathBuf> {
    let date = chrono::Local::now().format("%Y%m%d");
    dirs::data_local_dir().map(|dir| {
        dir.join(LOG_DIR)
            .join("logs")
            .join(format!("nerdle-{date}.log"))
    })
}

/// Route `log` output to `path` (appending). The terminal belongs to the
/// game, so nothing is written to stderr. Filter comes from `RUST_LOG`,
/// defaulting to `info`.
pub fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("installing logger")?;
    Ok(())
}
