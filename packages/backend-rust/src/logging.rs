use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::env_bool;

const LOG_FILE_PREFIX: &str = "prep-backend.log";

pub struct FileLogGuard {
    _guard: WorkerGuard,
}

#[derive(Debug, Clone)]
pub struct LogOptions {
    pub filter: String,
    pub file_dir: Option<PathBuf>,
    pub source_locations: bool,
}

impl LogOptions {
    /// `ENABLE_FILE_LOGS` turns on the daily file under `LOG_DIR`;
    /// `LOG_SOURCE_LOCATIONS` adds file:line to every event.
    pub fn from_env(filter: &str) -> Self {
        let file_dir = env_bool("ENABLE_FILE_LOGS").unwrap_or(false).then(|| {
            PathBuf::from(std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()))
        });

        Self {
            filter: filter.to_string(),
            file_dir,
            source_locations: env_bool("LOG_SOURCE_LOCATIONS").unwrap_or(false),
        }
    }
}

/// Install the global subscriber. The returned guard must outlive the
/// server, otherwise buffered file output is dropped.
pub fn init_tracing(options: &LogOptions) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(&options.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_file(options.source_locations)
        .with_line_number(options.source_locations);

    if let Some(log_dir) = options.file_dir.as_ref() {
        match std::fs::create_dir_all(log_dir) {
            Err(err) => {
                eprintln!("failed to create log directory {}: {err}", log_dir.display());
            }
            Ok(()) => {
                let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                let file_layer = fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_target(true);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(stdout_layer)
                    .with(file_layer)
                    .init();

                return Some(FileLogGuard { _guard: guard });
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();

    None
}
