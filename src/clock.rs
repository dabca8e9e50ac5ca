// Author: Jacques Murray

//! The wait primitive used between trials.
//!
//! The sender never sleeps directly. It asks its [`Clock`] for a future that
//! completes after the retry delay and races that future against the call's
//! cancellation token. [`SystemClock`] waits in real time; [`ManualClock`]
//! only completes a wait when a test releases it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_core::future::BoxFuture;
use tokio::sync::Semaphore;

use crate::sleep;

/// Produces futures that complete after a given duration.
pub trait Clock: Send + Sync {
    /// Returns a future that resolves once `delay` has elapsed.
    ///
    /// Dropping the future abandons the wait.
    fn after(&self, delay: Duration) -> BoxFuture<'static, ()>;
}

/// Real time, backed by the runtime selected through the timer features.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn after(&self, delay: Duration) -> BoxFuture<'static, ()> {
        Box::pin(sleep::sleep(delay))
    }
}

/// A clock whose waits complete only when released by [`ManualClock::advance`].
///
/// Every requested delay is recorded so tests can assert how many waits
/// happened and how long each one was meant to be. Releases issued before a
/// wait starts are banked and consumed in order.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<ManualInner>,
}

#[derive(Debug)]
struct ManualInner {
    permits: Semaphore,
    waits: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Creates a clock with no pending releases.
    pub fn new() -> Self {
        Self::with_permits(0)
    }

    /// Creates a clock that lets the first `permits` waits complete at once.
    pub fn with_permits(permits: usize) -> Self {
        Self {
            inner: Arc::new(ManualInner {
                permits: Semaphore::new(permits),
                waits: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Releases one wait, either pending or future.
    pub fn advance(&self) {
        self.inner.permits.add_permits(1);
    }

    /// Every delay requested so far, in order.
    pub fn waits(&self) -> Vec<Duration> {
        self.inner
            .waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of waits requested so far.
    pub fn wait_count(&self) -> usize {
        self.inner
            .waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn after(&self, delay: Duration) -> BoxFuture<'static, ()> {
        self.inner
            .waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delay);
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            // The semaphore is never closed.
            if let Ok(permit) = inner.permits.acquire().await {
                permit.forget();
            }
        })
    }
}
