// Author: Jacques Murray

//! Provides a runtime-agnostic sleep function.
//!
//! This module uses feature flags (`tokio-timer`, `async-std-timer`)
//! to determine which runtime's sleep function backs the
//! [`SystemClock`](crate::clock::SystemClock).

use std::time::Duration;

/// Sleeps for the specified duration, using the async runtime
/// selected by the crate's feature flags.
///
/// Will produce a compile error if no timer feature is enabled.
pub(crate) async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    cfg_if::cfg_if! {
        if #[cfg(feature = "tokio-timer")] {
            tokio::time::sleep(duration).await;
        } else if #[cfg(feature = "async-std-timer")] {
            async_std::task::sleep(duration).await;
        } else {
            compile_error!("No async timer feature enabled. Please enable 'tokio-timer' or 'async-std-timer'.");
        }
    }
}
