//! Integration tests for configuration validation

#![allow(clippy::expect_used)]

use mt76_usb_dma::config::{CodecConfig, DmaConfig, LoggingConfig};
use mt76_usb_dma::error::DmaError;
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = DmaConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
}

#[test]
fn test_default_limits_match_field_widths() {
    let codec = CodecConfig::default();
    assert_eq!(codec.max_packet_len, 65532);
    assert_eq!(codec.max_command_len, 16380);
    assert_eq!(codec.rx_trailer_len, 4);
}

#[test]
fn test_zero_packet_length() {
    let mut config = DmaConfig::default();
    config.codec.max_packet_len = 0;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Max packet length must be greater than 0")));
}

#[test]
fn test_packet_length_beyond_field() {
    let config = DmaConfig::default_with_overrides(|c| c.codec.max_packet_len = 65536);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Max packet length too large")));
}

#[test]
fn test_command_length_beyond_rx_field() {
    let config = DmaConfig::default_with_overrides(|c| c.codec.max_command_len = 16384);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Max command length too large")));
}

#[test]
fn test_unaligned_trailer() {
    let config = DmaConfig::default_with_overrides(|c| c.codec.rx_trailer_len = 6);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("multiple of 4")));
}

#[test]
fn test_empty_app_name() {
    let mut config = DmaConfig::default();
    config.logging.app_name = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_file_logging_requires_path() {
    let config = DmaConfig {
        logging: LoggingConfig {
            log_to_file: true,
            log_file_path: None,
            ..Default::default()
        },
        ..Default::default()
    };

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("log_file_path must be specified")));
}

#[test]
fn test_no_logging_output() {
    let mut config = DmaConfig::default();
    config.logging.log_to_console = false;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("At least one logging output")));
}

#[test]
fn test_validate_strict_collects_errors() {
    let config = DmaConfig::default_with_overrides(|c| {
        c.codec.max_packet_len = 0;
        c.codec.rx_trailer_len = 3;
    });

    match config.validate_strict() {
        Err(DmaError::ConfigError(msg)) => {
            assert!(msg.contains("Max packet length"));
            assert!(msg.contains("multiple of 4"));
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_toml_roundtrip() {
    let toml = r#"
        [codec]
        max_packet_len = 2048
        max_command_len = 512
        rx_trailer_len = 8

        [logging]
        app_name = "wlan0"
        log_level = "debug"
        log_to_console = true
        log_to_file = false
        json_format = true
    "#;

    let config = DmaConfig::from_toml(toml).expect("valid toml");
    assert_eq!(config.codec.max_packet_len, 2048);
    assert_eq!(config.codec.max_command_len, 512);
    assert_eq!(config.codec.rx_trailer_len, 8);
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.logging.json_format);
    assert!(config.validate().is_empty());

    let example = DmaConfig::example_config();
    let reparsed = DmaConfig::from_toml(&example).expect("example config parses");
    assert_eq!(reparsed.codec.max_packet_len, 65532);
}

#[test]
fn test_missing_sections_default() {
    let config = DmaConfig::from_toml("").expect("empty toml");
    assert_eq!(config.codec.rx_trailer_len, 4);
    assert_eq!(config.logging.app_name, "mt76-usb-dma");
}

#[test]
fn test_invalid_log_level() {
    let toml = r#"
        [logging]
        app_name = "wlan0"
        log_level = "loud"
        log_to_console = true
        log_to_file = false
        json_format = false
    "#;

    assert!(matches!(
        DmaConfig::from_toml(toml),
        Err(DmaError::ConfigError(_))
    ));
}

#[test]
fn test_save_and_load_file() {
    let path = std::env::temp_dir().join("mt76-usb-dma-config-test.toml");
    let config = DmaConfig::default_with_overrides(|c| c.codec.max_command_len = 1024);

    config.save_to_file(&path).expect("save");
    let loaded = DmaConfig::from_file(&path).expect("load");
    assert_eq!(loaded.codec.max_command_len, 1024);

    let _ = std::fs::remove_file(&path);
}
