//! # Protocol Layer
//!
//! What sits directly above the codec: routing of received frames to port
//! and event handlers, and sequence numbers for outgoing MCU commands.

pub mod dispatcher;
pub mod sequence;
