//! Logging contract.
//!
//! The crate never talks to a logging backend directly. Components that need
//! diagnostics take a [`Logger`] and call the level helpers; [`TracingLogger`]
//! is the default sink and forwards everything to the `tracing` macros.

use std::error::Error;

/// Severity levels accepted by a [`Logger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Sink capability for crate diagnostics.
///
/// Implementations decide where log records go. The `cause` parameter carries
/// an optional source error alongside the message.
pub trait Logger: Send + Sync {
    /// Default tag used by the level helpers.
    fn tag(&self) -> &str {
        "flowstate"
    }

    /// Process a single log record.
    fn log(&self, level: LogLevel, tag: &str, cause: Option<&(dyn Error + 'static)>, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, self.tag(), None, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, self.tag(), None, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, self.tag(), None, message);
    }

    fn error(&self, cause: Option<&(dyn Error + 'static)>, message: &str) {
        self.log(LogLevel::Error, self.tag(), cause, message);
    }
}

/// Default [`Logger`] backed by the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, tag: &str, cause: Option<&(dyn Error + 'static)>, message: &str) {
        match (level, cause) {
            (LogLevel::Debug, Some(cause)) => tracing::debug!(tag, cause = %cause, "{message}"),
            (LogLevel::Debug, None) => tracing::debug!(tag, "{message}"),
            (LogLevel::Info, Some(cause)) => tracing::info!(tag, cause = %cause, "{message}"),
            (LogLevel::Info, None) => tracing::info!(tag, "{message}"),
            (LogLevel::Warn, Some(cause)) => tracing::warn!(tag, cause = %cause, "{message}"),
            (LogLevel::Warn, None) => tracing::warn!(tag, "{message}"),
            (LogLevel::Error, Some(cause)) => tracing::error!(tag, cause = %cause, "{message}"),
            (LogLevel::Error, None) => tracing::error!(tag, "{message}"),
        }
    }
}
