// Author: Jacques Murray

//! Client configuration.
//!
//! A [`Config`] is plain data: credentials, where the API lives, and the
//! retry policy. It can be built in code or read from `MONIBOT_*`
//! environment variables.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::backoff::{RetryPolicy, DEFAULT_DELAY, DEFAULT_TRIALS};
use crate::error::ConfigError;
use crate::logger::{DiscardLogger, Logger};

/// Where the API is served by default.
pub const DEFAULT_BASE_URL: &str = "https://monibot.io";

/// Network timeout applied to each single exchange by default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The crate version, prefixed with `v`.
pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

pub const API_KEY_ENV: &str = "MONIBOT_API_KEY";
pub const URL_ENV: &str = "MONIBOT_URL";
pub const TRIALS_ENV: &str = "MONIBOT_TRIALS";
pub const DELAY_ENV: &str = "MONIBOT_DELAY";
pub const VERBOSE_ENV: &str = "MONIBOT_VERBOSE";

#[derive(Clone)]
pub struct Config {
    api_key: String,
    base_url: String,
    user_agent: String,
    trials: u32,
    delay: Duration,
    timeout: Duration,
    verbose: bool,
}

impl Config {
    /// Creates a configuration with the given API key and defaults for
    /// everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            trials: DEFAULT_TRIALS,
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            verbose: false,
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// `MONIBOT_API_KEY` is required. `MONIBOT_URL`, `MONIBOT_TRIALS`,
    /// `MONIBOT_DELAY` (whole seconds) and `MONIBOT_VERBOSE` are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = var(API_KEY_ENV).ok_or(ConfigError::MissingApiKey)?;
        let mut config = Config::new(api_key.trim());
        if let Some(url) = var(URL_ENV) {
            config = config.with_base_url(url.trim());
        }
        if let Some(trials) = var(TRIALS_ENV) {
            let trials = parse_integer(TRIALS_ENV, &trials)?;
            config = config.with_trials(u32::try_from(trials.max(1)).unwrap_or(u32::MAX));
        }
        if let Some(delay) = var(DELAY_ENV) {
            let secs = parse_integer(DELAY_ENV, &delay)?;
            config = config.with_delay(Duration::from_secs(secs.max(0).unsigned_abs()));
        }
        if let Some(verbose) = var(VERBOSE_ENV) {
            config = config.with_verbose(verbose.trim() == "true");
        }
        Ok(config)
    }

    /// Sets the base URL; a trailing `/` is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the `User-Agent` header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the maximum number of trials; zero is treated as one.
    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials.max(1);
        self
    }

    /// Sets the fixed wait between trials.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the network timeout of a single exchange.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables debug output through the `log` crate.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The API key sent as bearer token.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The base URL, without trailing `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The `User-Agent` header value.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// The network timeout of a single exchange.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether debug output is enabled.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// The retry policy built from the trials and delay settings.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.trials, self.delay)
    }

    /// The logger implied by [`Config::verbose`].
    pub fn logger(&self) -> Arc<dyn Logger> {
        #[cfg(feature = "logging")]
        if self.verbose {
            return Arc::new(crate::logger::LogLogger);
        }
        Arc::new(DiscardLogger)
    }

    /// Rejects configurations that can never authenticate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("trials", &self.trials)
            .field("delay", &self.delay)
            .field("timeout", &self.timeout)
            .field("verbose", &self.verbose)
            .finish()
    }
}

fn default_user_agent() -> String {
    format!("monibot/{VERSION}")
}

fn parse_integer(name: &'static str, value: &str) -> Result<i64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}
