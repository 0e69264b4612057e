//! Deserializable client options.

use std::fmt;

use serde::Deserialize;

use maxemail_client::{Credentials, Result};

/// Connection options, as found in an application's config file.
///
/// ```json
/// {"username": "api@user.com", "password": "apipass", "uri": "https://mxm.example.com/", "debugLogging": true}
/// ```
///
/// Either `token` or both `username` and `password` are required; the legacy
/// keys `user` and `pass` are accepted as aliases.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    pub token: Option<String>,
    #[serde(alias = "user")]
    pub username: Option<String>,
    #[serde(alias = "pass")]
    pub password: Option<String>,
    /// Base URI, default `https://mxm.xtremepush.com/`.
    pub uri: Option<String>,
    /// Log every request and response at debug level.
    #[serde(default)]
    pub debug_logging: bool,
}

impl ClientOptions {
    /// Read options from `MXM_TOKEN`, `MXM_USERNAME`, `MXM_PASSWORD`,
    /// `MXM_URI` and `MXM_DEBUG_LOGGING`.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();

        let debug_logging = var("MXM_DEBUG_LOGGING")
            .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Self {
            token: var("MXM_TOKEN"),
            username: var("MXM_USERNAME"),
            password: var("MXM_PASSWORD"),
            uri: var("MXM_URI"),
            debug_logging,
        }
    }

    /// Resolve the credential form.
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::from_parts(
            self.token.clone(),
            self.username.clone(),
            self.password.clone(),
        )
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("uri", &self.uri)
            .field("debug_logging", &self.debug_logging)
            .finish()
    }
}
