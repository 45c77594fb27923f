//! File logging
//!
//! The terminal belongs to the viewer, so tracing output goes to a file:
//! `--log-file`, or `<cache dir>/redis-viewer/redis-viewer.log`.
//! `RUST_LOG` overrides the default filter.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{Result, ViewerError};

pub const DEFAULT_LOG_FILTER: &str = "redis_viewer=info";

const LOG_FILE_NAME: &str = "redis-viewer.log";

pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("redis-viewer")
        .join(LOG_FILE_NAME)
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(path: &Path) -> Result<WorkerGuard> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| LOG_FILE_NAME.into());
    fs::create_dir_all(&dir)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(env_filter),
        )
        .try_init()
        .map_err(|e| ViewerError::Logging {
            reason: e.to_string(),
        })?;

    Ok(guard)
}
