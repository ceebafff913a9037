//! File logging. Stdout belongs to the console, so every event goes to a
//! daily rolling file under the log directory.

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn,symphonia=warn";
const LOG_FILE_PREFIX: &str = "maptune.log";

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Overrides `{data_dir}/logs`
    pub dir: Option<PathBuf>,
    /// `RUST_LOG` syntax; blank means the environment or the default
    pub filter: Option<String>,
}

/// Keeps the non-blocking writer alive; pending lines are flushed on drop.
pub struct LogGuard {
    dir: PathBuf,
    _worker: WorkerGuard,
}

impl LogGuard {
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// The directory logs will be written to, created if needed. Falls back to
/// the temp dir when the preferred one cannot be created.
pub fn resolve_log_dir(data_dir: &Path, dir: Option<PathBuf>) -> PathBuf {
    let preferred = dir.unwrap_or_else(|| data_dir.join("logs"));
    if fs::create_dir_all(&preferred).is_ok() {
        return preferred;
    }
    let fallback = std::env::temp_dir().join("maptune-logs");
    let _ = fs::create_dir_all(&fallback);
    fallback
}

fn build_filter(filter: Option<String>) -> EnvFilter {
    match filter.filter(|s| !s.trim().is_empty()) {
        Some(s) => EnvFilter::try_new(&s).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

pub fn init(data_dir: &Path, cfg: LogConfig) -> LogGuard {
    let dir = resolve_log_dir(data_dir, cfg.dir);
    let (writer, worker) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(writer);

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(build_filter(cfg.filter))
        .with(file_layer)
        .try_init();
    tracing::info!(log_dir = %dir.display(), "logging to file");

    LogGuard {
        dir,
        _worker: worker,
    }
}
