// Author: Jacques Murray

//! Defines the fixed-delay [`RetryPolicy`] used by the sender.
//!
//! The delays between trials come from a [`FixedDelay`] iterator limited
//! to `trials - 1` items. When the iterator returns `None`, the retry loop
//! stops, so a wait can never follow the final trial.

use std::iter::Take;
use std::time::Duration;

/// Number of trials a sender makes by default.
pub const DEFAULT_TRIALS: u32 = 12;

/// Delay between two trials by default.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// A backoff strategy that waits for a fixed duration.
/// This iterator is infinite unless limited (e.g., with `.take()`).
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    duration: Duration,
}

impl FixedDelay {
    /// Creates a new `FixedDelay` strategy.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Iterator for FixedDelay {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.duration)
    }
}

/// How many trials a logical call gets, and how long to wait between them.
///
/// Both values are fixed once the policy is built. A trial count of zero is
/// clamped to one instead of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    trials: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with `trials` attempts and a constant `delay`.
    pub fn new(trials: u32, delay: Duration) -> Self {
        Self {
            trials: trials.max(1),
            delay,
        }
    }

    /// A policy that makes exactly one trial.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Maximum number of trials, always at least one.
    pub fn trials(&self) -> u32 {
        self.trials
    }

    /// Delay inserted between two consecutive trials.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The waits available to one logical call, one fewer than the trials.
    pub fn delays(&self) -> Take<FixedDelay> {
        FixedDelay::new(self.delay).take(self.trials as usize - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TRIALS, DEFAULT_DELAY)
    }
}
