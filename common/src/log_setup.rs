use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to create log directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create log file appender in '{path}': {reason}")]
    Appender { path: PathBuf, reason: String },

    #[error("Logging already initialized")]
    AlreadyInitialized,
}

/// Where, besides the console, log records go.
#[derive(Debug, Clone)]
pub struct FileOutput<'a> {
    pub directory: &'a Path,
    pub file_prefix: &'a str,
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `base_level`. Warnings and errors are mirrored to
/// stderr. With `file_output`, records are also written to a daily rolling
/// file (five files kept).
pub fn setup_logging(
    base_level: &str,
    file_output: Option<FileOutput<'_>>,
) -> Result<(), LogSetupError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .map_err(|e| LogSetupError::InvalidFilter {
            filter: base_level.to_string(),
            reason: e.to_string(),
        })?;

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = match file_output {
        Some(output) => {
            std::fs::create_dir_all(output.directory).map_err(|source| LogSetupError::CreateDir {
                path: output.directory.to_path_buf(),
                source,
            })?;

            let file_appender = tracing_appender::rolling::Builder::new()
                .rotation(tracing_appender::rolling::Rotation::DAILY)
                .filename_prefix(output.file_prefix)
                .filename_suffix("log")
                .max_log_files(5)
                .build(output.directory)
                .map_err(|e| LogSetupError::Appender {
                    path: output.directory.to_path_buf(),
                    reason: e.to_string(),
                })?;

            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            LOG_GUARD
                .set(guard)
                .map_err(|_| LogSetupError::AlreadyInitialized)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_ansi(false)
                    .with_writer(file_writer),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}
