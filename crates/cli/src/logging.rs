//! Logging initialization shared by the subcommands.

use anyhow::{anyhow, Result};
use livepad_config::LogConfig;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log file of the config.
pub const LOG_PATH_ENV: &str = "LIVEPAD_LOG_PATH";

/// Log files larger than this are removed on startup.
const MAX_LOG_FILE_SIZE: u64 = 8 * 1024 * 1024;

/// Resolves the log file: `--log` first, then [`LOG_PATH_ENV`], then `[log] log-file`.
pub fn log_path(log_arg: Option<PathBuf>, log_config: &LogConfig) -> Option<PathBuf> {
    if let Some(log_path) = log_arg {
        Some(log_path)
    } else if let Ok(log_path) = std::env::var(LOG_PATH_ENV).map(PathBuf::from) {
        Some(log_path)
    } else {
        log_config.log_file.as_ref().map(PathBuf::from)
    }
}

/// Builds the filter directives from the max level and the optional extra targets.
pub fn env_filter(log_config: &LogConfig) -> EnvFilter {
    let max_level = log_config
        .max_level
        .parse()
        .unwrap_or(tracing::Level::DEBUG)
        .as_str()
        .to_ascii_lowercase();

    let directives = if log_config.log_target.is_empty() {
        max_level.clone()
    } else {
        format!("{max_level},{}", log_config.log_target)
    };

    EnvFilter::try_new(&directives).unwrap_or_else(|err| {
        eprintln!("Ignoring invalid log-target `{}`: {err}", log_config.log_target);
        EnvFilter::new(max_level)
    })
}

/// Installs the global subscriber.
///
/// The returned guard flushes the log file and must be kept alive until exit.
pub fn init(log_arg: Option<PathBuf>, log_config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (writer, ansi, guard) = match log_path(log_arg, log_config) {
        Some(log_path) => {
            if let Ok(metadata) = std::fs::metadata(&log_path) {
                if log_path.is_file() && metadata.len() > MAX_LOG_FILE_SIZE {
                    std::fs::remove_file(&log_path)?;
                }
            }

            let file_name = log_path
                .file_name()
                .ok_or_else(|| anyhow!("no file name in {log_path:?}"))?;

            let directory = log_path
                .parent()
                .ok_or_else(|| anyhow!("{log_path:?} has no parent"))?;

            let file_appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            (BoxMakeWriter::new(non_blocking), false, Some(guard))
        }
        None => (
            BoxMakeWriter::new(std::io::stderr),
            std::io::stderr().is_terminal(),
            None,
        ),
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(env_filter(log_config))
        .with_line_number(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}
