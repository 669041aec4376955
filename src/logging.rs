use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "wordpan-api.log";

/// Installs the global subscriber: stdout always, plus a daily rolling file
/// when `config.file_logs` is set. Hold on to the returned guard for the life
/// of the process, dropping it flushes and stops the file writer.
pub fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_writer, guard) = if config.file_logs {
        match rolling_writer(&config.log_dir) {
            Some((writer, guard)) => (Some(writer), Some(guard)),
            None => (None, None),
        }
    } else {
        (None, None)
    };

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    guard
}

fn rolling_writer(dir: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        // The subscriber is not installed yet.
        eprintln!("file logging disabled, cannot create {}: {err}", dir.display());
        return None;
    }
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}
