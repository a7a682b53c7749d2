//! # Logging Setup
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (from `RUST_LOG`, else the
//! configured level with noisy Matrix crates turned down), a console layer and a
//! plain-text session log file that is cleared on every start.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::config::LoggingConfig;

/// Default filter for `level`.
pub fn filter_directives(level: &str) -> String {
    format!("{level},matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn")
}

/// Installs the subscriber. Keep the returned guard alive until exit so the
/// file writer flushes.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    let dir = Path::new(&config.directory);
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }

    // Clear previous session log
    let log_path = dir.join(&config.file);
    if log_path.exists() {
        let _ = fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(dir, &config.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config.level_directive())));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_parse() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let directives = filter_directives(level);
            assert!(directives.starts_with(level));
            assert!(EnvFilter::try_new(&directives).is_ok());
        }
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let config = LoggingConfig {
            level: "LOUD".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(filter_directives(config.level_directive()), filter_directives("info"));
    }
}
