//! Structured logging setup.
//!
//! Installs a global `tracing-subscriber` from [`LoggingConfig`]. `RUST_LOG`
//! overrides the configured level when set.

use crate::config::LoggingConfig;
use crate::error::{DmaError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Build the filter used by [`init`]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(config));

    let result = match (config.log_to_file, config.log_file_path.as_deref()) {
        (true, Some(path)) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| DmaError::ConfigError(format!("Failed to open log file: {e}")))?;
            let builder = builder.with_writer(Mutex::new(file)).with_ansi(false);
            if config.json_format {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
        _ if config.json_format => builder.json().try_init(),
        _ => builder.try_init(),
    };

    result.map_err(|e| DmaError::ConfigError(format!("Failed to install logger: {e}")))?;
    tracing::debug!(app = %config.app_name, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_once() {
        let path = std::env::temp_dir().join("mt76-usb-dma-logging-test.log");
        let config = LoggingConfig {
            log_to_file: true,
            log_file_path: Some(path.display().to_string()),
            ..Default::default()
        };

        assert!(init(&config).is_ok());
        assert!(matches!(init(&config), Err(DmaError::ConfigError(_))));
        assert!(path.exists());
    }
}
