//! Tracing subscriber setup for the host binary.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppConfig, LogFormat, LogLevel};

/// Directives used when `RUST_LOG` is unset. The FTP crate logs under the
/// `ftp` target.
pub fn default_directives(level: LogLevel) -> String {
    let level = level.to_tracing_level();
    format!("shapecam={},ftp={}", level, level)
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init_logging(config: &AppConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(config.log_level)))
        .context("Failed to create log filter")?;

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Compact => registry
            .with(fmt::layer().with_target(true).compact())
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_target(true).with_ansi(false).json())
            .try_init(),
    }
    .context("Failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_both_targets() {
        assert_eq!(default_directives(LogLevel::Debug), "shapecam=DEBUG,ftp=DEBUG");
        assert_eq!(default_directives(LogLevel::Warn), "shapecam=WARN,ftp=WARN");
    }

    #[test]
    fn directives_parse_as_filter() {
        assert!(EnvFilter::try_new(default_directives(LogLevel::Trace)).is_ok());
    }
}
