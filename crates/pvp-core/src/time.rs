//! Tick timing
//!
//! The combat engine advances in discrete server ticks. Callers that measure
//! time in milliseconds feed a [`TickClock`], which hands back whole ticks and
//! carries the remainder over to the next call.

use serde::{Deserialize, Serialize};

/// Server ticks per second
pub const TICKS_PER_SECOND: u32 = 20;

/// Milliseconds covered by one server tick
pub const MILLIS_PER_TICK: u64 = 1000 / TICKS_PER_SECOND as u64;

/// Converts a duration in seconds to ticks
pub fn seconds_to_ticks(seconds: u32) -> u32 {
    seconds * TICKS_PER_SECOND
}

/// Accumulates millisecond deltas into whole ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickClock {
    /// Milliseconds not yet converted into a tick
    pending_ms: u64,
    /// Ticks handed out so far
    total_ticks: u64,
}

impl TickClock {
    /// Create a clock with nothing pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a delta and return how many whole ticks elapsed
    pub fn advance(&mut self, delta_ms: u64) -> u32 {
        self.pending_ms += delta_ms;
        let ticks = self.pending_ms / MILLIS_PER_TICK;
        self.pending_ms %= MILLIS_PER_TICK;
        self.total_ticks += ticks;
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }

    /// Ticks handed out since creation
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Milliseconds waiting for the next tick
    pub fn pending_ms(&self) -> u64 {
        self.pending_ms
    }
}
