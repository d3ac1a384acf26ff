//! Command sequence numbers.
//!
//! The 4-bit sequence field pairs an MCU command with its completion event.
//! Zero is never handed out: unsolicited events carry it.

use crate::core::types::SequenceNumber;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lock-free allocator cycling through 1..=15.
#[derive(Debug, Default)]
pub struct SequenceAllocator {
    last: AtomicU8,
}

impl SequenceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next sequence number. Concurrent callers never receive the same value
    /// unless more than 15 allocations race.
    pub fn next(&self) -> SequenceNumber {
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let next = Self::successor(current);
            match self
                .last
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return SequenceNumber::from_bits(u32::from(next)),
                Err(actual) => current = actual,
            }
        }
    }

    fn successor(seq: u8) -> u8 {
        match (seq + 1) & SequenceNumber::MAX {
            0 => 1,
            n => n,
        }
    }
}
