//! Host clock adapter.
//!
//! Maps `std::time::Instant` onto the controller's millisecond
//! [`Instant`](crate::time::Instant), counted from adapter creation.

use crate::time::Instant;

pub struct HostClock {
    start: std::time::Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since the clock was created (monotonic).
    pub fn now(&self) -> Instant {
        let ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        Instant::from_millis(ms)
    }
}
