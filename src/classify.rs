// Author: Jacques Murray

//! Decides, from one transport result alone, whether a logical call is done.
//!
//! | result              | outcome   |
//! |---------------------|-----------|
//! | transport error     | retryable |
//! | 200                 | success   |
//! | 429                 | retryable |
//! | other 4xx           | terminal  |
//! | anything else       | retryable |
//!
//! The decision never depends on the trial count or elapsed time.

use crate::error::{Cause, StatusError, TransportError};
use crate::transport::Response;

/// The classification of one trial.
#[derive(Debug)]
pub enum Outcome {
    Success(Response),
    Retryable(Cause),
    /// The same request would fail the same way again.
    Terminal(StatusError),
}

/// Classifies the result of one exchange.
pub fn classify(result: Result<Response, TransportError>) -> Outcome {
    let response = match result {
        Ok(response) => response,
        Err(err) => return Outcome::Retryable(Cause::Transport(err)),
    };
    match response.status() {
        200 => Outcome::Success(response),
        // rate limited
        429 => Outcome::Retryable(Cause::Status(status_error(response))),
        // not found, wrong apiKey, bad request, ...
        400..=499 => Outcome::Terminal(status_error(response)),
        // 5xx, 3xx, 1xx, 2xx other than 200
        _ => Outcome::Retryable(Cause::Status(status_error(response))),
    }
}

fn status_error(response: Response) -> StatusError {
    let status = response.status();
    let body = String::from_utf8_lossy(response.body()).into_owned();
    StatusError::new(status, body)
}
