// Author: Jacques Murray

//! The retry-capable sender.
//!
//! [`Sender::send`] turns one logical call into a bounded, strictly
//! sequential run of trials:
//!
//! 1. log `trial #n/max for METHOD PATH` and hand the request to the transport;
//! 2. classify the result (see [`crate::classify`]);
//! 3. success returns the body, terminal returns [`Error::Client`] at once;
//! 4. a retryable result waits the fixed delay and tries again, unless the
//!    trial budget is spent, in which case [`Error::Exhausted`] is returned.
//!
//! The wait races the call's cancellation token. Whichever fires first wins;
//! a cancelled call returns [`Error::Cancelled`] and never issues another
//! trial.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::backoff::RetryPolicy;
use crate::classify::{classify, Outcome};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{ConfigError, Error, Result};
use crate::logger::{DiscardLogger, Logger};
use crate::transport::{HttpTransport, Request, Transport};

/// Sends requests through a [`Transport`], retrying transient failures.
///
/// Holds no per-call state, so one instance can serve any number of
/// concurrent calls.
pub struct Sender<T = HttpTransport> {
    transport: T,
    policy: RetryPolicy,
    logger: Arc<dyn Logger>,
    clock: Arc<dyn Clock>,
}

impl Sender<HttpTransport> {
    /// Builds the production stack described by `config`.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let logger = config.logger();
        let transport = HttpTransport::new(config, Arc::clone(&logger))?;
        Ok(Self::new(transport, config.policy()).with_logger(logger))
    }
}

impl<T: Transport> Sender<T> {
    /// Creates a sender that logs nothing and waits in real time.
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            logger: Arc::new(DiscardLogger),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the logger that receives per-trial debug lines.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Replaces the clock used for the waits between trials.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The trial budget and delay of every call.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// The transport performing the exchanges.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `request` until it succeeds, fails terminally, runs out of
    /// trials, or `cancel` fires. Returns the body of the successful response.
    pub async fn send(&self, request: &Request, cancel: &CancellationToken) -> Result<Vec<u8>> {
        let trials = self.policy.trials();
        let mut delays = self.policy.delays();
        let mut trial = 0;

        loop {
            trial += 1;
            self.logger.debug(format_args!(
                "trial #{trial}/{trials} for {} {}",
                request.method(),
                request.path()
            ));

            let cause = match classify(self.transport.send(request, cancel).await) {
                Outcome::Success(response) => return Ok(response.into_body()),
                Outcome::Terminal(err) => return Err(Error::Client(err)),
                Outcome::Retryable(cause) => cause,
            };
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let Some(delay) = delays.next() else {
                self.logger.debug(format_args!(
                    "giving up {} {} after {trial} trials: {cause}",
                    request.method(),
                    request.path()
                ));
                return Err(Error::Exhausted { trials: trial, last: cause });
            };
            self.logger.debug(format_args!("{cause}, will retry in {delay:?}"));

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                () = self.clock.after(delay) => {}
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("transport", &self.transport)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
