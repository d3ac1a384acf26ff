//! # mt76-usb-dma
//!
//! DMA transfer header codec for USB-attached MT76 wireless controllers.
//!
//! Every buffer exchanged with the device starts with a little-endian 32-bit
//! info word that names the port, says whether the payload is a packet or an
//! MCU command/event, and records the payload length. Frames are zero padded
//! to 4 bytes and always end in at least four bytes of trailer.
//!
//! ## Quick Start
//! ```rust
//! use bytes::BytesMut;
//! use mt76_usb_dma::core::tx::{parse_tx, wrap_packet, TxPacketFlags};
//! use mt76_usb_dma::core::types::QueueSelect;
//!
//! let mut frame = BytesMut::new();
//! let flags = TxPacketFlags { is_80211: true, ..Default::default() };
//! wrap_packet(&[0u8; 10], QueueSelect::Edca, flags, &mut frame);
//!
//! assert_eq!(frame.len(), 20);
//! assert_eq!(&frame[..4], &[0x0c, 0x00, 0x08, 0x04]);
//! assert_eq!(parse_tx(&frame).unwrap().declared_len, 12);
//! ```
//!
//! ## Modules
//! - [`core`]: header layout, encoder, decoder, `tokio_util` codecs
//! - [`protocol`]: rx dispatch and command sequence numbers
//! - [`config`]: size policy and logging settings
//! - [`error`]: error types
//! - [`utils`]: logging setup and metrics

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use crate::core::rx::{decode, RxFrame, RxInfo};
pub use crate::core::tx::{wrap, TxInfo};
pub use crate::core::types::{EventType, Port, QueueSelect, TransferType};
pub use crate::error::{DecodeError, DmaError, Result};
