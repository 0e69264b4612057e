//! Maxemail API credentials.
//!
//! Secrets are redacted in Debug output.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

/// Message used whenever no complete credential form is supplied.
pub const MISSING_CREDENTIALS: &str = "API config requires token OR username & password";

/// Authentication for one client: an API token or a username/password pair.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Sent as `Authorization: Bearer <token>`.
    Token(String),
    /// Sent as HTTP basic auth.
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.debug_tuple("Token").field(&"[REDACTED]").finish(),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

impl Credentials {
    /// Token credentials.
    pub fn token(token: impl Into<String>) -> Self {
        Credentials::Token(token.into())
    }

    /// Username/password credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Pick the credential form from optional parts.
    ///
    /// A token wins over username/password. Without a token both username and
    /// password are required. Empty strings count as absent.
    pub fn from_parts(
        token: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());

        if let Some(token) = present(token) {
            return Ok(Credentials::Token(token));
        }

        match (present(username), present(password)) {
            (Some(username), Some(password)) => Ok(Credentials::Basic { username, password }),
            _ => Err(Error::invalid_argument(MISSING_CREDENTIALS)),
        }
    }

    /// Returns true for token credentials.
    pub fn is_token(&self) -> bool {
        matches!(self, Credentials::Token(_))
    }

    /// The username, for basic credentials.
    pub fn username(&self) -> Option<&str> {
        match self {
            Credentials::Basic { username, .. } => Some(username),
            Credentials::Token(_) => None,
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        match self {
            Credentials::Token(token) => format!("Bearer {}", token),
            Credentials::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
            }
        }
    }
}
