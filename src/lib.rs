// Author: Jacques Murray

//! # monibot
//!
//! An async client for the Monibot REST API: watchdog heartbeats, machine
//! samples and metric updates, plus read access to watchdog, machine and
//! metric definitions.
//!
//! ## Goals
//!
//! * Turn one logical API call into as many HTTP exchanges as it takes,
//!   retrying transient failures (network errors, 429, 5xx) with a fixed
//!   delay and giving up immediately on client errors (other 4xx).
//! * Keep every call cancellable through a [`CancellationToken`].
//! * Keep the retry loop testable without real time or real sockets: the
//!   [`Clock`], [`Logger`] and [`Transport`] are all injected.
//!
//! **Note:** a timer feature must be enabled for [`SystemClock`]:
//! `tokio-timer` (default) or `async-std-timer`. [`HttpTransport`] runs on
//! `reqwest` and needs a tokio reactor either way.
//!
//! ### Example: Heartbeat
//!
//! ```rust,no_run
//! use monibot::{Api, CancellationToken};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Api::new(std::env::var("MONIBOT_API_KEY")?)?;
//!     let cancel = CancellationToken::new();
//!     api.post_watchdog_heartbeat("5f6d343f517715a471d8768730c3f2f4", &cancel)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Example: Custom retry policy
//!
//! ```rust,no_run
//! use monibot::{Api, CancellationToken, Config, Error};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::new("my-api-key")
//!         .with_trials(3)
//!         .with_delay(Duration::from_secs(1));
//!     let api = Api::from_config(&config).unwrap();
//!
//!     match api.post_metric_inc("metric-id", 1, &CancellationToken::new()).await {
//!         Ok(()) => println!("counted"),
//!         Err(Error::Client(err)) => println!("rejected: {err}"),
//!         Err(err) => println!("failed: {err}"),
//!     }
//! }
//! ```

pub mod api;
pub mod backoff;
pub mod classify;
pub mod clock;
pub mod config;
pub mod error;
pub mod histogram;
pub mod logger;
pub mod models;
pub mod sender;
mod sleep;
pub mod transport;

pub use api::Api;
pub use backoff::{FixedDelay, RetryPolicy};
pub use classify::{classify, Outcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, VERSION};
pub use error::{Cause, ConfigError, Error, Result, StatusError, TransportError};
pub use histogram::{parse_values, stringify_values, HistogramError};
#[cfg(feature = "logging")]
pub use logger::LogLogger;
pub use logger::{DiscardLogger, Logger};
pub use models::{Machine, MachineSample, Metric, MetricType, Watchdog};
pub use sender::Sender;
pub use tokio_util::sync::CancellationToken;
pub use transport::{HttpTransport, Method, Request, Response, Transport};
