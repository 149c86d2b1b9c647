//! Server-relative time.
//!
//! Timestamps handed to peers are seconds since the process started, read
//! from a monotonic clock so wall-clock adjustments never reorder entries.

use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct ServerClock {
    epoch: Instant,
}

impl ServerClock {
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Seconds since the epoch, saturating at `i32::MAX` (about 68 years).
    pub fn now(&self) -> i32 {
        i32::try_from(self.epoch.elapsed().as_secs()).unwrap_or(i32::MAX)
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }
}

impl Default for ServerClock {
    fn default() -> Self {
        Self::start()
    }
}
