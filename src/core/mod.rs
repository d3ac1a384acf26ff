//! # Core Codec Components
//!
//! Bit-level model of the 32-bit DMA info word and the encode/decode paths
//! built on it.
//!
//! ## Components
//! - **bits**: const-checked field positions for both directions
//! - **types**: ports, transfer types, queues, events, MCU commands
//! - **tx**: header encoder (host to device)
//! - **rx**: header decoder (device to host) and aggregate iteration
//! - **codec**: `tokio_util` framing on top of both
//!
//! ## Wire Format
//! ```text
//! [info word (4, LE)] [payload (N)] [zero pad to 4B, minimum 4]
//! ```
//!
//! ## Safety
//! - No decode path reads past the end of its buffer
//! - Reserved enum values are errors, never casts

pub mod bits;
pub mod codec;
pub mod rx;
pub mod tx;
pub mod types;
