// Author: Jacques Murray

//! Typed wrappers around the API's resources.
//!
//! Each operation builds a [`Request`], hands it to the [`Sender`] and, for
//! read endpoints, decodes the JSON body. Retrying is left entirely to the
//! sender.

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::histogram::stringify_values;
use crate::models::{Machine, MachineSample, Metric, Watchdog};
use crate::sender::Sender;
use crate::transport::{HttpTransport, Request, Transport};

/// Access to the Monibot REST API.
#[derive(Debug)]
pub struct Api<T = HttpTransport> {
    sender: Sender<T>,
}

impl Api<HttpTransport> {
    /// An API client for `https://monibot.io` that retries 12 times, every
    /// 5 seconds.
    pub fn new(api_key: impl Into<String>) -> std::result::Result<Self, ConfigError> {
        Self::from_config(&Config::new(api_key))
    }

    /// An API client built from `config`.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        Ok(Self::with_sender(Sender::from_config(config)?))
    }
}

impl<T: Transport> Api<T> {
    /// Wraps an already configured sender.
    pub fn with_sender(sender: Sender<T>) -> Self {
        Self { sender }
    }

    /// The sender used by every operation.
    pub fn sender(&self) -> &Sender<T> {
        &self.sender
    }

    /// Checks that the API is reachable and the API key is accepted.
    pub async fn get_ping(&self, cancel: &CancellationToken) -> Result<()> {
        self.sender.send(&Request::get("ping"), cancel).await?;
        Ok(())
    }

    /// Lists all watchdogs.
    pub async fn get_watchdogs(&self, cancel: &CancellationToken) -> Result<Vec<Watchdog>> {
        self.get_json("watchdogs".to_string(), cancel).await
    }

    /// Fetches one watchdog by id.
    pub async fn get_watchdog(
        &self,
        watchdog_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Watchdog> {
        self.get_json(format!("watchdog/{}", segment(watchdog_id)), cancel)
            .await
    }

    /// Signals that the watched job is alive.
    pub async fn post_watchdog_heartbeat(
        &self,
        watchdog_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.post(format!("watchdog/{}/heartbeat", segment(watchdog_id)), String::new(), cancel)
            .await
    }

    /// Resets a watchdog, as if a heartbeat had just been received.
    pub async fn post_watchdog_reset(
        &self,
        watchdog_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.post(format!("watchdog/{}/reset", segment(watchdog_id)), String::new(), cancel)
            .await
    }

    /// Lists all machines.
    pub async fn get_machines(&self, cancel: &CancellationToken) -> Result<Vec<Machine>> {
        self.get_json("machines".to_string(), cancel).await
    }

    /// Fetches one machine by id.
    pub async fn get_machine(
        &self,
        machine_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Machine> {
        self.get_json(format!("machine/{}", segment(machine_id)), cancel)
            .await
    }

    /// Uploads one resource usage sample.
    pub async fn post_machine_sample(
        &self,
        machine_id: &str,
        sample: &MachineSample,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.post(format!("machine/{}/sample", segment(machine_id)), sample.to_form(), cancel)
            .await
    }

    /// Lists all metrics.
    pub async fn get_metrics(&self, cancel: &CancellationToken) -> Result<Vec<Metric>> {
        self.get_json("metrics".to_string(), cancel).await
    }

    /// Fetches one metric by id.
    pub async fn get_metric(&self, metric_id: &str, cancel: &CancellationToken) -> Result<Metric> {
        self.get_json(format!("metric/{}", segment(metric_id)), cancel)
            .await
    }

    /// Increments a counter metric. Fails for non-counter metrics.
    pub async fn post_metric_inc(
        &self,
        metric_id: &str,
        value: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.post(format!("metric/{}/inc", segment(metric_id)), format!("value={value}"), cancel)
            .await
    }

    /// Sets a gauge metric. Fails for non-gauge metrics.
    pub async fn post_metric_set(
        &self,
        metric_id: &str,
        value: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.post(format!("metric/{}/set", segment(metric_id)), format!("value={value}"), cancel)
            .await
    }

    /// Adds values to a histogram metric. Fails for non-histogram metrics.
    pub async fn post_metric_values(
        &self,
        metric_id: &str,
        values: &[i64],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let body = format!("values={}", stringify_values(values));
        self.post(format!("metric/{}/values", segment(metric_id)), body, cancel)
            .await
    }

    async fn get_json<D: DeserializeOwned>(
        &self,
        path: String,
        cancel: &CancellationToken,
    ) -> Result<D> {
        let data = self.sender.send(&Request::get(path), cancel).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn post(&self, path: String, body: String, cancel: &CancellationToken) -> Result<()> {
        self.sender.send(&Request::post(path, body), cancel).await?;
        Ok(())
    }
}

/// Encodes an id so it stays a single path segment.
fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}
