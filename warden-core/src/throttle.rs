//! Rate limiting for operator-visible warnings.
//!
//! Repeated world-query timeouts under load would otherwise flood the log
//! with one warning per dropped packet evaluation.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Lets an action through at most once per interval.
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Creates a throttle that admits one event per `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// Returns `true` if the caller may act now; records the admission.
    pub fn allow(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last.lock();
        match *last {
            Some(prev) if now.duration_since(prev) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
