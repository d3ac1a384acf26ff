//! # Utility Modules
//!
//! Ambient support for the codec: structured logging setup and counters.

pub mod logging;
pub mod metrics;
