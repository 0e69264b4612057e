//! Leveled logger sink handed to the client by the application.
//!
//! Internal diagnostics go through `tracing` directly. The [`Logger`] trait is
//! the caller-facing sink: deprecation warnings, debug request logging and the
//! file transfer helper report through it, so applications can route them
//! wherever they like. The default is [`NullLogger`].

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::Level;

/// Key/value pairs attached to a log line.
pub type LogContext<'a> = &'a [(&'a str, &'a str)];

/// A leveled log sink.
pub trait Logger: Send + Sync {
    /// Record one message.
    fn log(&self, level: Level, message: &str, context: LogContext<'_>);

    fn debug(&self, message: &str, context: LogContext<'_>) {
        self.log(Level::DEBUG, message, context);
    }

    fn info(&self, message: &str, context: LogContext<'_>) {
        self.log(Level::INFO, message, context);
    }

    fn warning(&self, message: &str, context: LogContext<'_>) {
        self.log(Level::WARN, message, context);
    }

    fn error(&self, message: &str, context: LogContext<'_>) {
        self.log(Level::ERROR, message, context);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str, _context: LogContext<'_>) {}
}

/// Forwards to `tracing` events under the `maxemail` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, context: LogContext<'_>) {
        let context = format_context(context);
        match level {
            Level::ERROR => tracing::error!(target: "maxemail", %context, "{}", message),
            Level::WARN => tracing::warn!(target: "maxemail", %context, "{}", message),
            Level::INFO => tracing::info!(target: "maxemail", %context, "{}", message),
            Level::DEBUG => tracing::debug!(target: "maxemail", %context, "{}", message),
            Level::TRACE => tracing::trace!(target: "maxemail", %context, "{}", message),
        }
    }
}

fn format_context(context: LogContext<'_>) -> String {
    context
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shared, swappable reference to the active logger.
///
/// Interceptors hold a clone of the handle, so a logger set on the client after
/// the transport was built still receives their output.
#[derive(Clone)]
pub struct LoggerHandle {
    current: Arc<RwLock<Arc<dyn Logger>>>,
}

impl LoggerHandle {
    /// Handle pointing at `logger`.
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            current: Arc::new(RwLock::new(logger)),
        }
    }

    /// The logger currently installed.
    pub fn get(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the logger for every holder of this handle.
    pub fn set(&self, logger: Arc<dyn Logger>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = logger;
    }
}

impl Default for LoggerHandle {
    fn default() -> Self {
        Self::new(Arc::new(NullLogger))
    }
}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerHandle").finish_non_exhaustive()
    }
}
