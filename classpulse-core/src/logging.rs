//! Logging infrastructure for classpulse
//!
//! Logs are written to `~/.local/state/classpulse/` following XDG standards, one
//! `classpulse.YYYY-MM-DD.log` file per UTC day.

use crate::config::{self, Config, LoggingConfig};
use crate::error::Error;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize the logging system
///
/// Sets up tracing with:
/// - File output to XDG state directory
/// - Daily rotation, keeping at most `max_files` files
/// - Configurable log level via config or RUST_LOG env var
pub fn init(config: &LoggingConfig) -> crate::error::Result<LoggingGuard> {
    let log_dir = Config::state_dir();

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = daily_appender(&log_dir, config.max_files)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // A second init (e.g. from tests driving the CLI in-process) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Daily-rotating appender whose files are named by [`config::log_file_name`].
fn daily_appender(dir: &Path, max_files: usize) -> crate::error::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config::LOG_FILE_PREFIX)
        .filename_suffix(config::LOG_FILE_SUFFIX)
        .max_log_files(max_files.max(1))
        .build(dir)
        .map_err(|e| Error::Config(format!("failed to create log appender: {}", e)))
}

/// Initialize logging for tests (logs to stdout)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

/// Guard that keeps the logging system alive
///
/// When dropped, flushes any pending log writes.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Returns the path of today's log file
pub fn log_file_path() -> PathBuf {
    Config::log_path(Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_log_file_path() {
        let path = log_file_path();
        let today = Utc::now().date_naive();
        assert!(path.ends_with(config::log_file_name(today)));
        assert!(path.starts_with(Config::state_dir()));
    }

    #[test]
    fn test_appender_writes_the_dated_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut appender = daily_appender(dir.path(), 5).unwrap();
        writeln!(appender, "hello").unwrap();
        appender.flush().unwrap();

        let expected = dir.path().join(config::log_file_name(Utc::now().date_naive()));
        assert!(expected.exists(), "missing {}", expected.display());
        assert!(!dir.path().join("classpulse.log").exists());
    }
}
