//! Reconnect policy: bounded-attempt exponential backoff.
//!
//! The policy is a plain value object driven by the connection loop, so
//! the backoff state (attempts remaining, current delay) is inspectable
//! and testable without real timers.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use sublink_client::backoff::ReconnectPolicy;
//!
//! let mut policy = ReconnectPolicy::new(3, Duration::from_millis(15_000));
//! assert_eq!(policy.next_delay(), Some(Duration::from_millis(15_000)));
//! assert_eq!(policy.next_delay(), Some(Duration::from_millis(30_000)));
//! assert_eq!(policy.next_delay(), Some(Duration::from_millis(60_000)));
//! assert_eq!(policy.next_delay(), None);
//! ```

use std::time::Duration;

/// Scheduler state for reconnection after a connection loss.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    attempts_remaining: u32,
    current_delay: Duration,
}

impl ReconnectPolicy {
    /// Create a policy with the given bounds.
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            attempts_remaining: max_attempts,
            current_delay: initial_delay,
        }
    }

    /// Take the next backoff delay, doubling for the attempt after it.
    ///
    /// Returns `None` once attempts are exhausted; the caller must surface
    /// that as a terminal condition rather than retrying silently.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts_remaining == 0 {
            return None;
        }
        let delay = self.current_delay;
        self.attempts_remaining -= 1;
        self.current_delay = self.current_delay.saturating_mul(2);
        Some(delay)
    }

    /// Restore the initial attempt budget and delay.
    ///
    /// Automatic reconnection never resets mid-run; the intended entry for
    /// an explicit fresh reconnect is a new `Client`, which constructs its
    /// policy from scratch. `reset` is for callers driving a policy
    /// directly.
    pub fn reset(&mut self) {
        self.attempts_remaining = self.max_attempts;
        self.current_delay = self.initial_delay;
    }

    /// Attempts left before giving up.
    #[inline]
    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    /// Delay the next attempt would wait.
    #[inline]
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    /// Whether the policy has given up.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.attempts_remaining == 0
    }
}
