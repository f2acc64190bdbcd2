//! Tracing setup for the uploader binary.
//!
//! Diagnostics go to stderr so stdout carries only the per-file notices and the run summary.
//! Setting `DATASET_UPLOADER_LOG_FILE` adds a plain-text copy of every event in that file.
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable naming an optional log file.
pub const LOG_FILE_ENV: &str = "DATASET_UPLOADER_LOG_FILE";

/// Install the global subscriber.
///
/// `RUST_LOG` selects the filter (default `info`). The returned guard owns the file writer's
/// background thread; buffered lines are flushed only when it is dropped, so callers must keep
/// it alive until just before the process exits.
#[must_use = "dropping the guard stops file logging"]
pub fn init_tracing() -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let file = open_log_file();
    let (file_layer, guard) = match file {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .compact();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn open_log_file() -> Option<std::fs::File> {
    let path = std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())?;

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .inspect_err(|err| eprintln!("Failed to open log file {path}: {err}"))
        .ok()
}
