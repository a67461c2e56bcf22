use std::time::Duration;

use ::backoff::backoff::Backoff;

/// A retry policy that waits `base_delay × n` before the nth retry and
/// gives up after `max_retries` retries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearBackoff {
    base_delay: Duration,
    max_retries: u32,
    retries: u32,
}

impl LinearBackoff {
    /// Creates a policy that has not retried yet.
    #[inline]
    pub fn new(base_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_retries,
            retries: 0,
        }
    }

    /// Returns how many retries have been handed out so far.
    #[inline]
    pub fn retries(&self) -> u32 {
        self.retries
    }
}

impl Backoff for LinearBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries >= self.max_retries {
            return None;
        }
        self.retries += 1;
        Some(self.base_delay.saturating_mul(self.retries))
    }

    fn reset(&mut self) {
        self.retries = 0;
    }
}
