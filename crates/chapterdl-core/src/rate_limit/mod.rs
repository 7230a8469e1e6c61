//! Process-wide request pacing.
//!
//! One `RateLimiter` is shared (via `Arc`) by every worker of every chapter in
//! a run, so the minimum spacing holds across the whole process rather than per
//! worker.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Grants permission to issue one request at a time, at least `interval` apart.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_grant: Mutex::new(None),
        }
    }

    /// Limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Blocks until at least `interval` has passed since the previous grant.
    ///
    /// The lock is held across the sleep: waiting callers queue on the mutex and
    /// each one measures its wait from the grant just before it. No fairness
    /// order among waiters is promised.
    pub fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }
        let mut last = self
            .last_grant
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(prev) = *last {
            let wait = match prev.checked_add(self.interval) {
                Some(ready_at) => ready_at.saturating_duration_since(Instant::now()),
                None => self.interval,
            };
            if !wait.is_zero() {
                tracing::trace!(wait_ms = wait.as_millis() as u64, "rate limiter wait");
                std::thread::sleep(wait);
            }
        }
        *last = Some(Instant::now());
    }
}
