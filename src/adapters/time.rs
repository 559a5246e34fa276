//! Monotonic process clock.
//!
//! Telemetry timestamps are milliseconds since the clock was created
//! (process start in practice), taken from `std::time::Instant` so wall
//! clock jumps never move them backwards.

use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since creation.
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
