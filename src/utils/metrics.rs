//! Codec Metrics
//!
//! Atomic counters for frames moving through the codec and the reasons
//! frames were dropped. Safe to bump from any thread.

use crate::error::DecodeError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Counters for codec and dispatch activity
#[derive(Debug)]
pub struct Metrics {
    /// TX frames wrapped
    pub frames_encoded: AtomicU64,
    /// TX bytes written, header and padding included
    pub bytes_encoded: AtomicU64,
    /// RX frames decoded successfully
    pub frames_decoded: AtomicU64,
    /// RX payload bytes handed upward
    pub bytes_decoded: AtomicU64,
    /// RX frames handed to a handler
    pub frames_delivered: AtomicU64,
    /// RX frames addressed to the discard port
    pub dropped_discard: AtomicU64,
    /// RX frames with no registered handler
    pub dropped_no_handler: AtomicU64,
    pub decode_too_short: AtomicU64,
    pub decode_length_overflow: AtomicU64,
    pub decode_unrecognized: AtomicU64,
    /// TX payloads refused by the size policy
    pub oversized_payloads: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            frames_encoded: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            frames_decoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            frames_delivered: AtomicU64::new(0),
            dropped_discard: AtomicU64::new(0),
            dropped_no_handler: AtomicU64::new(0),
            decode_too_short: AtomicU64::new(0),
            decode_length_overflow: AtomicU64::new(0),
            decode_unrecognized: AtomicU64::new(0),
            oversized_payloads: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn frame_encoded(&self, byte_count: u64) {
        self.frames_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn frame_decoded(&self, byte_count: u64) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn frame_delivered(&self) {
        self.frames_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn discarded(&self) {
        self.dropped_discard.fetch_add(1, Ordering::Relaxed);
    }

    pub fn no_handler(&self) {
        self.dropped_no_handler.fetch_add(1, Ordering::Relaxed);
    }

    pub fn oversized(&self) {
        self.oversized_payloads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed decode under its reason
    pub fn decode_failed(&self, err: &DecodeError) {
        let counter = match err {
            DecodeError::TooShort { .. } => &self.decode_too_short,
            DecodeError::LengthOverflow { .. } => &self.decode_length_overflow,
            DecodeError::Unrecognized { .. } => &self.decode_unrecognized,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_encoded: self.frames_encoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            dropped_discard: self.dropped_discard.load(Ordering::Relaxed),
            dropped_no_handler: self.dropped_no_handler.load(Ordering::Relaxed),
            decode_too_short: self.decode_too_short.load(Ordering::Relaxed),
            decode_length_overflow: self.decode_length_overflow.load(Ordering::Relaxed),
            decode_unrecognized: self.decode_unrecognized.load(Ordering::Relaxed),
            oversized_payloads: self.oversized_payloads.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            frames_encoded = snapshot.frames_encoded,
            bytes_encoded = snapshot.bytes_encoded,
            frames_decoded = snapshot.frames_decoded,
            bytes_decoded = snapshot.bytes_decoded,
            frames_delivered = snapshot.frames_delivered,
            dropped_discard = snapshot.dropped_discard,
            dropped_no_handler = snapshot.dropped_no_handler,
            decode_too_short = snapshot.decode_too_short,
            decode_length_overflow = snapshot.decode_length_overflow,
            decode_unrecognized = snapshot.decode_unrecognized,
            oversized_payloads = snapshot.oversized_payloads,
            uptime_seconds = snapshot.uptime_seconds,
            "DMA codec metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_encoded: u64,
    pub bytes_encoded: u64,
    pub frames_decoded: u64,
    pub bytes_decoded: u64,
    pub frames_delivered: u64,
    pub dropped_discard: u64,
    pub dropped_no_handler: u64,
    pub decode_too_short: u64,
    pub decode_length_overflow: u64,
    pub decode_unrecognized: u64,
    pub oversized_payloads: u64,
    pub uptime_seconds: u64,
}

impl MetricsSnapshot {
    /// Frames lost for any reason
    pub fn dropped_total(&self) -> u64 {
        self.dropped_discard
            + self.dropped_no_handler
            + self.decode_too_short
            + self.decode_length_overflow
            + self.decode_unrecognized
    }
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Process-wide metrics shared by every codec and dispatcher
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}
