// Author: Jacques Murray

//! One physical HTTP exchange.
//!
//! [`Transport`] is the narrow seam between the retry loop and the network:
//! it sends a [`Request`] once and hands back the raw status and body, or a
//! [`TransportError`]. It never interprets the status code. The sender's tests
//! substitute a scripted implementation; [`HttpTransport`] is the real one.

use std::fmt;
use std::sync::Arc;

use futures_core::future::BoxFuture;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{ConfigError, TransportError};
use crate::logger::Logger;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Response bodies longer than this are truncated in debug output.
const LOG_PREVIEW_BYTES: usize = 256;

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// The method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// A request for one API resource.
///
/// `path` is relative to `<base url>/api/` and has no leading host. An empty
/// body means no body is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    body: Vec<u8>,
}

impl Request {
    /// A request with an explicit method and body.
    pub fn new(method: Method, path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method,
            path: path.into(),
            body: body.into(),
        }
    }

    /// A GET request without body.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, Vec::new())
    }

    /// A POST request with a form-urlencoded body, possibly empty.
    pub fn post(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::Post, path, body)
    }

    /// The HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The path relative to `<base url>/api/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request body; empty means none.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Status code and body of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: Vec<u8>,
}

impl Response {
    /// A response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The response body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the response, returning its body.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Performs exactly one HTTP exchange per call.
///
/// Implementations must be usable from many concurrent calls and should stop
/// the exchange when `cancel` fires.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: &'a Request,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Response, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send<'a>(
        &'a self,
        request: &'a Request,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Response, TransportError>> {
        (**self).send(request, cancel)
    }
}

/// Sends requests to `<base url>/api/<path>` with `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    logger: Arc<dyn Logger>,
    api_url: String,
    api_key: String,
    user_agent: String,
}

impl HttpTransport {
    /// Builds a transport with its own `reqwest` client, honoring the
    /// configured network timeout.
    pub fn new(config: &Config, logger: Arc<dyn Logger>) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self::with_client(client, config, logger))
    }

    /// Builds a transport around an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client, config: &Config, logger: Arc<dyn Logger>) -> Self {
        Self {
            client,
            logger,
            api_url: format!("{}/api/", config.base_url()),
            api_key: config.api_key().to_string(),
            user_agent: config.user_agent().to_string(),
        }
    }

    /// The URL every request path is appended to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn exchange(&self, request: &Request) -> Result<Response, TransportError> {
        let url = format!("{}{}", self.api_url, request.path());
        let method = request.method();
        self.logger.debug(format_args!("{method} {url}"));

        let mut builder = self
            .client
            .request(method.into(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json");
        if !request.body().is_empty() {
            self.logger
                .debug(format_args!("body={}", String::from_utf8_lossy(request.body())));
            builder = builder
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(request.body().to_vec());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                self.logger.debug(format_args!("{method} {url}: {err}"));
                return Err(err.into());
            }
        };
        let status = response.status().as_u16();
        let data = response
            .bytes()
            .await
            .map_err(|err| TransportError::with_source(format!("cannot read response data: {err}"), err))?;

        self.logger.debug(format_args!(
            "{status} ({} bytes) {}",
            data.len(),
            preview(&data)
        ));
        Ok(Response::new(status, data.to_vec()))
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn send<'a>(
        &'a self,
        request: &'a Request,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Response, TransportError>> {
        Box::pin(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    self.logger.debug(format_args!("{} {}: cancelled", request.method(), request.path()));
                    Err(TransportError::new("cancelled"))
                }
                result = self.exchange(request) => result,
            }
        })
    }
}

/// The first [`LOG_PREVIEW_BYTES`] of `data`, with `...` appended if cut.
fn preview(data: &[u8]) -> String {
    if data.len() > LOG_PREVIEW_BYTES {
        format!("{}...", String::from_utf8_lossy(&data[..LOG_PREVIEW_BYTES]))
    } else {
        String::from_utf8_lossy(data).into_owned()
    }
}
