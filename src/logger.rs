//! Console plus file logging for a benchmark run.

use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::LogConfig,
    error::{Error, Result},
};

/// Keeps the file writer alive. Dropping it flushes what is still buffered.
#[derive(Debug)]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
    path:    Option<PathBuf>,
}

impl LogGuard {
    /// The log file of this run, `None` when logging to the console only.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// `<dir>/<YYYYMMDD_HHMMSS>_<basename>`
pub fn log_file_path(dir: &Path, basename: &str, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}_{basename}", now.format("%Y%m%d_%H%M%S")))
}

fn open_log_file(config: &LogConfig) -> Result<(PathBuf, std::io::Result<File>)> {
    let dir = shellexpand::path::tilde(&config.dir);
    fs::create_dir_all(&dir).map_err(|e| {
        Error::Configuration(format!(
            "cannot create log directory {}: {e}",
            dir.display()
        ))
    })?;
    let path = log_file_path(&dir, &config.basename, Local::now());
    let file = OpenOptions::new().create(true).append(true).open(&path);
    Ok((path, file))
}

fn filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| Error::Configuration(format!("invalid log level `{level}`: {e}")))
}

/// Installs the global subscriber. Records go to stdout and to a fresh
/// timestamped file under `config.dir`. If that file cannot be opened the
/// run continues with console output only.
pub fn init(config: &LogConfig) -> Result<LogGuard> {
    let filter = filter(&config.level)?;
    let (path, file) = open_log_file(config)?;

    let (file_layer, worker, open_err) = match file {
        Ok(file) => {
            let (writer, worker) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(worker), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Configuration(format!("logger already initialised: {e}")))?;

    let path = match open_err {
        None => {
            info!("Logging to {}.", path.display());
            Some(path)
        }
        Some(e) => {
            warn!(
                "Cannot open log file {}: {e}. Logging to the console only.",
                path.display()
            );
            None
        }
    };
    Ok(LogGuard {
        _worker: worker,
        path,
    })
}
