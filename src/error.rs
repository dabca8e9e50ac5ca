// Author: Jacques Murray

//! Error types for the sender, the endpoint layer and configuration.
//!
//! A logical call ends in exactly one of four ways: data, a terminal client
//! error, exhausted retries, or cancellation. The [`Error`] variants mirror
//! that, so callers can tell "gave up" from "was asked to stop".

use std::error::Error as StdError;

use thiserror::Error;

/// A failure to complete one physical HTTP exchange.
///
/// Covers everything below the status line: malformed URLs, DNS and connect
/// failures, TLS, timeouts, cancellation of the exchange and failures while
/// reading the response body. Always retryable.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    /// Creates an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error with a message and the underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The message, without the underlying cause.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::with_source(err.to_string(), err)
    }
}

/// A response whose status code was not 200.
///
/// Displays as `status <code>`, followed by `: <body>` when the server sent
/// a body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status {status}{}", body_suffix(.body))]
pub struct StatusError {
    pub status: u16,
    pub body: String,
}

impl StatusError {
    /// Creates an error for `status` with the response body as text.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

/// Why a single trial was judged retryable.
#[derive(Debug, Error)]
pub enum Cause {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 429, 5xx or any other status outside 200 and the 4xx range.
    #[error(transparent)]
    Status(#[from] StatusError),
}

/// The error returned by a logical call.
#[derive(Debug, Error)]
pub enum Error {
    /// A 4xx response other than 429. Never retried.
    #[error(transparent)]
    Client(StatusError),

    /// Every trial failed with a retryable cause. Displays as the last one.
    #[error("{last}")]
    Exhausted { trials: u32, last: Cause },

    /// The call's cancellation token fired before a result was available.
    #[error("cancelled")]
    Cancelled,

    /// The response body was not the JSON the endpoint expects.
    #[error("cannot decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// The HTTP status behind this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Client(err) => Some(err.status),
            Error::Exhausted {
                last: Cause::Status(err),
                ..
            } => Some(err.status),
            _ => None,
        }
    }

    /// Whether the call ended because its cancellation token fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Shorthand for results of logical calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Invalid or incomplete configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("empty apiKey")]
    MissingApiKey,

    #[error("invalid {name} {value:?}: expected an integer")]
    InvalidNumber { name: &'static str, value: String },

    #[error("cannot build http client: {0}")]
    Client(#[from] reqwest::Error),
}
