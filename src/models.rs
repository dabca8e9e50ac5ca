// Author: Jacques Murray

//! Resources exposed by the API, as returned by the read endpoints.

use serde::{Deserialize, Serialize};

/// A watchdog expects a heartbeat at least every `interval_millis`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watchdog {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub interval_millis: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// The kind of a metric, sent as an integer on the wire.
///
/// Codes this crate does not know decode as [`MetricType::Unknown`] and
/// encode back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum MetricType {
    /// Incremented with [`Api::post_metric_inc`](crate::Api::post_metric_inc).
    #[default]
    Counter,
    /// Set with [`Api::post_metric_set`](crate::Api::post_metric_set).
    Gauge,
    /// Fed with [`Api::post_metric_values`](crate::Api::post_metric_values).
    Histogram,
    Unknown(i64),
}

impl From<i64> for MetricType {
    fn from(value: i64) -> Self {
        match value {
            0 => MetricType::Counter,
            1 => MetricType::Gauge,
            2 => MetricType::Histogram,
            other => MetricType::Unknown(other),
        }
    }
}

impl From<MetricType> for i64 {
    fn from(value: MetricType) -> Self {
        match value {
            MetricType::Counter => 0,
            MetricType::Gauge => 1,
            MetricType::Histogram => 2,
            MetricType::Unknown(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub metric_type: MetricType,
}

/// Resource usage of a machine at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MachineSample {
    /// Unix time in milliseconds.
    pub tstamp: i64,
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
    pub cpu_percent: i32,
    pub mem_percent: i32,
    pub disk_percent: i32,
}

impl MachineSample {
    /// The form-urlencoded body of a sample upload.
    pub fn to_form(&self) -> String {
        format!(
            "tstamp={}&load1={:.3}&load5={:.3}&load15={:.3}&cpu={}&mem={}&disk={}",
            self.tstamp,
            self.load1,
            self.load5,
            self.load15,
            self.cpu_percent,
            self.mem_percent,
            self.disk_percent
        )
    }
}
