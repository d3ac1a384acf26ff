//! # Error Types
//!
//! Error handling for the DMA descriptor codec.
//!
//! Two layers are kept apart:
//! - [`DecodeError`]: what can go wrong while parsing a header the device sent.
//!   These are expected in normal operation (USB glitches, newer firmware) and
//!   the frame is dropped, never the driver.
//! - [`DmaError`]: everything else (I/O, configuration, size policy) and the
//!   error type of the `tokio_util` codecs.
//!
//! ## Example Usage
//! ```rust
//! use mt76_usb_dma::core::rx::decode;
//! use mt76_usb_dma::error::DecodeError;
//!
//! match decode(&[0x00, 0x01]) {
//!     Err(DecodeError::TooShort { len }) => assert_eq!(len, 2),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Dispatcher-related error messages
    pub const ERR_DISPATCHER_WRITE_LOCK: &str = "Failed to acquire write lock on dispatcher";
    pub const ERR_DISPATCHER_READ_LOCK: &str = "Failed to acquire read lock on dispatcher";

    /// Handler registration errors
    pub const ERR_DISCARD_HANDLER: &str = "Cannot register a handler for the discard port";
}

/// Header field that carried a value this driver does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    Port,
    TransferType,
    EventType,
    CommandType,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderField::Port => "port",
            HeaderField::TransferType => "transfer type",
            HeaderField::EventType => "event type",
            HeaderField::CommandType => "command type",
        };
        f.write_str(name)
    }
}

/// Failure to parse a DMA header.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Buffer too short for DMA header: {len} bytes")]
    TooShort { len: usize },

    #[error("Declared length {declared} exceeds the {available} bytes available")]
    LengthOverflow { declared: usize, available: usize },

    #[error("Unrecognized {field} value: {raw:#x}")]
    Unrecognized { field: HeaderField, raw: u8 },
}

// DmaError is the primary error type for codec, dispatch and configuration
#[derive(Error, Debug)]
pub enum DmaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Payload too large: {len} bytes (max {max})")]
    OversizedPayload { len: usize, max: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

/// Type alias for Results using DmaError
pub type Result<T> = std::result::Result<T, DmaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_display_names_field() {
        let err = DecodeError::Unrecognized {
            field: HeaderField::EventType,
            raw: 0x0b,
        };
        assert_eq!(err.to_string(), "Unrecognized event type value: 0xb");
    }

    #[test]
    fn test_decode_error_converts() {
        let err: DmaError = DecodeError::TooShort { len: 3 }.into();
        assert!(matches!(
            err,
            DmaError::Decode(DecodeError::TooShort { len: 3 })
        ));
    }
}
