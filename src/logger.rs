// Author: Jacques Murray

//! Pluggable debug logging.
//!
//! Every [`Sender`](crate::Sender) and [`HttpTransport`](crate::HttpTransport)
//! owns its own [`Logger`], so diagnostics can be silenced or redirected per
//! instance. The default is [`DiscardLogger`].

use std::fmt;

/// A sink for per-trial diagnostic messages.
///
/// Implementations must never panic.
pub trait Logger: Send + Sync {
    /// Records one debug message.
    fn debug(&self, args: fmt::Arguments<'_>);
}

/// A logger that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardLogger;

impl Logger for DiscardLogger {
    fn debug(&self, _args: fmt::Arguments<'_>) {}
}

/// Forwards messages to the `log` crate at debug level.
#[cfg(feature = "logging")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLogger;

#[cfg(feature = "logging")]
impl Logger for LogLogger {
    fn debug(&self, args: fmt::Arguments<'_>) {
        log::debug!(target: "monibot", "{}", args);
    }
}

impl<F> Logger for F
where
    F: Fn(fmt::Arguments<'_>) + Send + Sync,
{
    fn debug(&self, args: fmt::Arguments<'_>) {
        self(args)
    }
}
