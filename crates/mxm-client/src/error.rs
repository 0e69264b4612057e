//! Error types for maxemail-client.

use std::fmt;

/// Result type alias for maxemail-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Maxemail API operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for an [`ErrorKind::InvalidArgument`] error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument(message.into()))
    }

    /// Shorthand for an [`ErrorKind::Runtime`] error.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime(message.into()))
    }

    /// Returns the HTTP status code, for vendor and transport HTTP errors.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Client { status, .. } | ErrorKind::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if Maxemail rejected the call with an error message.
    pub fn is_vendor_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Client { .. })
    }

    /// Returns the Maxemail error message, if this is a vendor error.
    pub fn vendor_message(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Client { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns true for a generic 4xx transport error (no vendor message).
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Http { status, .. } if (400..500).contains(&status))
    }

    /// Returns true for a generic 5xx transport error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Http { status, .. } if status >= 500)
    }

    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Returns true if a response body could not be decoded as JSON.
    pub fn is_decode_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Decode { .. })
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Malformed configuration or arguments supplied by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Local I/O failure (temp file, write, MIME detection, archive extraction).
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Response body is not valid JSON.
    #[error("{message}")]
    Decode {
        kind: DecodeErrorKind,
        message: String,
    },

    /// Response is valid JSON but lacks a value the operation relies on.
    #[error("Unexpected value: {0}")]
    UnexpectedValue(String),

    /// Maxemail rejected the call (4xx with an error message body).
    #[error("Maxemail API error ({status}): {message}")]
    Client { status: u16, message: String },

    /// Any other HTTP error status returned by the transport.
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Typed (de)serialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Transport could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Classification of a JSON decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Nesting deeper than the parser allows.
    MaxDepth,
    /// Structurally invalid document (mismatched brackets, missing separators).
    Malformed,
    /// Raw control character inside a string.
    ControlCharacter,
    /// General syntax error, including truncated input.
    Syntax,
    /// Input bytes are not valid UTF-8.
    Utf8,
    /// Invalid `\u` escape or lone surrogate.
    Utf16,
    /// Anything else.
    Unknown,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            DecodeErrorKind::MaxDepth => "Maximum stack depth exceeded",
            DecodeErrorKind::Malformed => "Invalid or malformed JSON",
            DecodeErrorKind::ControlCharacter => "Unexpected control character found",
            DecodeErrorKind::Syntax => "Syntax error",
            DecodeErrorKind::Utf8 => "Malformed UTF-8 characters, possibly incorrectly encoded",
            DecodeErrorKind::Utf16 => "Malformed UTF-16 characters, possibly incorrectly encoded",
            DecodeErrorKind::Unknown => "Unknown error",
        };
        f.write_str(description)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() || timed_out(&err) {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ErrorKind::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

/// Read timeouts can surface as an io error deep in the source chain.
fn timed_out(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if inner
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut)
        {
            return true;
        }
        source = inner.source();
    }
    false
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::InvalidArgument(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(
            ErrorKind::InvalidArgument(format!("Invalid URL: {}", err)),
            err,
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Runtime(err.to_string()), err)
    }
}
