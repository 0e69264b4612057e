//! Deprecation notices delivered through the HTTP `Warning` header.
//!
//! Maxemail flags deprecated calls with `Warning: 299 MxmApi/<ver> "<text>"`.
//! Each such value is logged at warning level and recorded in a
//! [`DeprecationSink`]; other warn-codes and agents are ignored.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use tracing::warn;

use super::Interceptor;
use crate::error::Result;
use crate::logger::LoggerHandle;
use crate::response::Response;

const DEPRECATION_CODE: &str = "299";
const AGENT_PREFIX: &str = "mxmapi/";

/// Notices kept until drained; older ones are dropped first.
pub const MAX_PENDING_NOTICES: usize = 100;

/// One parsed `Warning` header value: `code agent "text" ["date"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningValue {
    pub code: String,
    pub agent: String,
    pub text: String,
    pub date: Option<String>,
}

impl WarningValue {
    /// Split a header value on spaces, honouring double-quoted fields.
    ///
    /// Returns `None` when fewer than three fields are present.
    pub fn parse(value: &str) -> Option<Self> {
        let mut fields = split_fields(value).into_iter();
        let code = fields.next()?;
        let agent = fields.next()?;
        let text = fields.next()?;
        let date = fields.next().filter(|d| !d.is_empty());
        Some(Self {
            code,
            agent,
            text,
            date,
        })
    }

    /// True for a 299 warning issued by the Maxemail API.
    pub fn is_deprecation(&self) -> bool {
        self.code == DEPRECATION_CODE
            && self
                .agent
                .get(..AGENT_PREFIX.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(AGENT_PREFIX))
    }
}

fn split_fields(value: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = value.trim().chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    quoted = false;
                }
            }
            // The escape keeps the next character literal but stays in the text.
            '\\' if quoted => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => quoted = true,
            ' ' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// A deprecation warning received from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    /// Warn-agent, e.g. `MxmApi/v100`.
    pub agent: String,
    pub message: String,
    /// Optional warn-date.
    pub date: Option<DateTime<Utc>>,
}

impl DeprecationNotice {
    fn from_warning(warning: WarningValue) -> Self {
        let date = warning
            .date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
            .map(|d| d.with_timezone(&Utc));
        Self {
            agent: warning.agent,
            message: warning.text,
            date,
        }
    }
}

type DeprecationCallback = Arc<dyn Fn(&DeprecationNotice) + Send + Sync>;

/// Collects deprecation notices and forwards them to an optional callback.
///
/// At most [`MAX_PENDING_NOTICES`] undrained notices are kept, so a client
/// that never calls `take` does not grow without bound. Clones share the
/// same storage.
#[derive(Clone, Default)]
pub struct DeprecationSink {
    notices: Arc<Mutex<VecDeque<DeprecationNotice>>>,
    callback: Arc<RwLock<Option<DeprecationCallback>>>,
}

impl DeprecationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notice and invoke the callback, if any.
    pub fn notify(&self, notice: DeprecationNotice) {
        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            callback(&notice);
        }
        let mut notices = self.notices.lock().unwrap_or_else(PoisonError::into_inner);
        if notices.len() == MAX_PENDING_NOTICES {
            notices.pop_front();
        }
        notices.push_back(notice);
    }

    /// Drain the pending notices, oldest first.
    pub fn take(&self) -> Vec<DeprecationNotice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Install a callback run for every future notice.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(&DeprecationNotice) + Send + Sync + 'static,
    {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(callback));
    }
}

impl fmt::Debug for DeprecationSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self
            .notices
            .lock()
            .map(|notices| notices.len())
            .unwrap_or_default();
        f.debug_struct("DeprecationSink")
            .field("pending", &pending)
            .finish_non_exhaustive()
    }
}

/// Reports `Warning: 299 MxmApi/...` values to the logger and the sink.
#[derive(Debug, Clone)]
pub struct DeprecationInterceptor {
    logger: LoggerHandle,
    sink: DeprecationSink,
}

impl DeprecationInterceptor {
    pub fn new(logger: LoggerHandle, sink: DeprecationSink) -> Self {
        Self { logger, sink }
    }

    fn inspect(&self, response: &Response) {
        let notices = response
            .header_values("warning")
            .into_iter()
            .filter_map(WarningValue::parse)
            .filter(WarningValue::is_deprecation);

        for warning in notices {
            warn!(agent = %warning.agent, "Maxemail deprecation: {}", warning.text);
            self.logger.get().warning(&warning.text, &[]);
            self.sink.notify(DeprecationNotice::from_warning(warning));
        }
    }
}

impl Interceptor for DeprecationInterceptor {
    fn name(&self) -> &'static str {
        "mxm-deprecated"
    }

    fn on_response<'a>(&'a self, response: Response) -> BoxFuture<'a, Result<Response>> {
        self.inspect(&response);
        future::ready(Ok(response)).boxed()
    }
}
