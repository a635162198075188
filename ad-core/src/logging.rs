//! Structured logging setup using the `tracing` ecosystem.
//!
//! Console output goes to stderr so command output on stdout stays
//! scriptable; an optional daily-rotated file receives the same events.

use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling;

use crate::config::LoggingConfig;
use crate::error::AdResult;

/// Initialize the global tracing subscriber with console and file output.
///
/// # Arguments
/// * `level` - Filter directive, e.g. "info" or "ad_resolver=debug"
/// * `log_dir` - Directory for the rotated log files
/// * `json_output` - If true, the file output is JSON
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> AdResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, "alldebrid.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_new(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    if json_output {
        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| crate::error::AdError::Internal(format!("logging already initialized: {e}")))?;
    } else {
        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| crate::error::AdError::Internal(format!("logging already initialized: {e}")))?;
    }

    tracing::debug!("logging initialized at level={level}, dir={}", log_dir.display());

    Ok(LogGuard { _guard: Some(guard) })
}

/// Initialize logging from a `[logging]` config section.
///
/// Falls back to console-only output when no log directory is configured.
pub fn init_from_config(config: &LoggingConfig, level_override: Option<&str>) -> AdResult<LogGuard> {
    let level = level_override.unwrap_or(&config.level);
    if config.directory.is_empty() {
        init_console_logging(level);
        return Ok(LogGuard { _guard: None });
    }
    init_logging(level, Path::new(&config.directory), config.json_output)
}

/// Guard that keeps the non-blocking log writer alive.
/// Drop this to flush and close the log file.
pub struct LogGuard {
    _guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initialize a console-only logger on stderr.
pub fn init_console_logging(level: &str) {
    let env_filter = EnvFilter::try_new(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logging_does_not_panic() {
        // Subsequent calls are no-ops.
        init_console_logging("debug");
        init_console_logging("not a filter [");
    }

    #[test]
    fn test_init_from_config_without_directory() {
        let config = LoggingConfig::default();
        assert!(init_from_config(&config, Some("warn")).is_ok());
    }
}
