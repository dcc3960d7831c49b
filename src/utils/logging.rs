//! Logging system initialization
//!
//! Stdout carries the action request stream, so log output never goes there.
//! It is written to `app.log` next to `config.json` (%APPDATA%\AwesomeHands),
//! or to stderr when that directory is unusable. Each start moves the previous
//! session's log aside so the last [`MAX_LOG_FILES`] sessions stay readable.

use crate::config::ConfigManager;
use crate::error::{GestureError, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt};

/// Number of previous session logs kept (app.log.1 through app.log.9)
pub const MAX_LOG_FILES: u8 = 9;

const LOG_FILE_NAME: &str = "app.log";

/// Initialize the logging system
///
/// Level defaults to INFO; `RUST_LOG` overrides it, e.g.
/// `RUST_LOG=awesome_hands::engine=debug` to trace every dispatch decision.
pub fn init_logging() -> Result<()> {
    let log_dir = ConfigManager::get_config_dir();
    let (writer, file_error) = match open_log_file(&log_dir) {
        Ok(appender) => (BoxMakeWriter::new(appender), None),
        Err(e) => (BoxMakeWriter::new(std::io::stderr), Some(e)),
    };

    let subscriber = fmt()
        .with_writer(writer)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| GestureError::ConfigError(Box::new(e)))?;

    match file_error {
        None => tracing::info!(
            "Awesome Hands v{} logging to {}",
            env!("CARGO_PKG_VERSION"),
            log_dir.join(LOG_FILE_NAME).display()
        ),
        Some(e) => tracing::warn!(
            "Awesome Hands v{} cannot log to {} ({}), logging to stderr",
            env!("CARGO_PKG_VERSION"),
            log_dir.display(),
            e
        ),
    }

    Ok(())
}

/// Rotate the previous session's log and open a fresh `app.log` in `log_dir`
fn open_log_file(log_dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir)?;
    rotate_logs(&log_dir.join(LOG_FILE_NAME))?;

    // Rotation happens per session above, never by time
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| GestureError::ConfigError(Box::new(e)))
}

/// `app.log` -> `app.log.<index>`
fn history_path(log_path: &Path, index: u8) -> PathBuf {
    let mut name = log_path.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Shift `log_path` into the numbered history
///
/// The oldest entry falls off, every other entry moves up one slot and
/// `log_path` becomes `.1`. Gaps in the history are carried along unchanged.
fn rotate_logs(log_path: &Path) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let history: Vec<PathBuf> = (1..=MAX_LOG_FILES)
        .map(|index| history_path(log_path, index))
        .collect();

    if let Some(oldest) = history.last()
        && oldest.exists()
    {
        std::fs::remove_file(oldest)?;
    }
    for slots in history.windows(2).rev() {
        if slots[0].exists() {
            std::fs::rename(&slots[0], &slots[1])?;
        }
    }
    std::fs::rename(log_path, &history[0])?;
    Ok(())
}
