//! # Configuration Management
//!
//! Settings for the DMA codec and its logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - `MT76_DMA_*` environment variables via `from_env()`
//!
//! ## Size Policy
//! The encoder itself trusts its caller. The limits here are what the
//! [`TxCodec`](crate::core::codec::TxCodec) checks before a payload is
//! wrapped, so an oversized frame is refused rather than silently truncated
//! by the length field.

use crate::core::bits::DMA_TRAILER_LEN;
use crate::core::rx::MAX_RX_PAYLOAD;
use crate::core::tx::MAX_TX_PAYLOAD;
use crate::error::{DmaError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Largest trailer accepted between aggregated rx frames
pub const MAX_TRAILER_LEN: usize = 64;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DmaConfig {
    #[serde(default)]
    pub codec: CodecConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DmaConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| DmaError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| DmaError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| DmaError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Defaults overridden by `MT76_DMA_*` environment variables.
    /// Unparseable values are ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MT76_DMA_MAX_PACKET_LEN") {
            if let Ok(val) = val.parse::<usize>() {
                config.codec.max_packet_len = val;
            }
        }

        if let Ok(val) = std::env::var("MT76_DMA_MAX_COMMAND_LEN") {
            if let Ok(val) = val.parse::<usize>() {
                config.codec.max_command_len = val;
            }
        }

        if let Ok(val) = std::env::var("MT76_DMA_RX_TRAILER_LEN") {
            if let Ok(val) = val.parse::<usize>() {
                config.codec.rx_trailer_len = val;
            }
        }

        if let Ok(val) = std::env::var("MT76_DMA_LOG_LEVEL") {
            if let Ok(level) = val.parse::<Level>() {
                config.logging.log_level = level;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DmaError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| DmaError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.codec.validate());
        errors.extend(self.logging.validate());
        errors
    }

    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DmaError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Size policy and framing of the codec
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodecConfig {
    /// Largest data frame payload accepted for transmission
    pub max_packet_len: usize,

    /// Largest MCU command payload accepted for transmission
    pub max_command_len: usize,

    /// Bytes following each frame in an aggregated rx transfer
    pub rx_trailer_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_packet_len: MAX_TX_PAYLOAD,
            // Commands are answered through the 14-bit rx length field
            max_command_len: MAX_RX_PAYLOAD,
            rx_trailer_len: DMA_TRAILER_LEN,
        }
    }
}

impl CodecConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_packet_len == 0 {
            errors.push("Max packet length must be greater than 0".to_string());
        } else if self.max_packet_len > MAX_TX_PAYLOAD {
            errors.push(format!(
                "Max packet length too large: {} (maximum: {MAX_TX_PAYLOAD})",
                self.max_packet_len
            ));
        }

        if self.max_command_len == 0 {
            errors.push("Max command length must be greater than 0".to_string());
        } else if self.max_command_len > MAX_RX_PAYLOAD {
            errors.push(format!(
                "Max command length too large: {} (maximum: {MAX_RX_PAYLOAD})",
                self.max_command_len
            ));
        }

        if self.rx_trailer_len % 4 != 0 {
            errors.push(format!(
                "RX trailer length must be a multiple of 4, got {}",
                self.rx_trailer_len
            ));
        } else if self.rx_trailer_len > MAX_TRAILER_LEN {
            errors.push(format!(
                "RX trailer length too large: {} (maximum: {MAX_TRAILER_LEN})",
                self.rx_trailer_len
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    pub log_to_console: bool,

    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("mt76-usb-dma"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
