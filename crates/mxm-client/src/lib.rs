//! # maxemail-client
//!
//! HTTP transport for the Maxemail JSON API.
//!
//! This crate provides the plumbing shared by every Maxemail call:
//! - Token or username/password authentication headers
//! - Form-encoded and multipart request bodies
//! - A JSON codec with classified decode errors
//! - Interceptors for vendor error parsing, deprecation warnings and
//!   debug request logging
//! - A caller-supplied leveled [`Logger`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (maxemail-rpc: Client, Service, FileTransfer)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Interceptors                            │
//! │  - RequestLogger (debug logging)                            │
//! │  - DeprecationInterceptor (Warning: 299 MxmApi/...)         │
//! │  - ErrorParser (4xx {"msg": ...} -> vendor error)           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MxmHttpClient                            │
//! │  - Auth + default headers, base URL resolution              │
//! │  - Compression, connection pooling, timeouts                │
//! │  - Status checks                                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use maxemail_client::{ClientConfig, Credentials, ErrorParser, MxmHttpClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), maxemail_client::Error> {
//!     let base = url::Url::parse("https://mxm.xtremepush.com/api/json/")?;
//!     let client = MxmHttpClient::new(base, &Credentials::token("apitoken"), ClientConfig::default())?
//!         .with_interceptor(Arc::new(ErrorParser));
//!
//!     let request = client.post("folder").form(&[("method", "fetchRoot")])?;
//!     let root = client.execute(request).await?.decode().await?;
//!     println!("{root}");
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod credentials;
mod error;
pub mod json;
mod logger;
pub mod middleware;
mod request;
mod response;
pub mod sanitize;

pub use client::MxmHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use credentials::{Credentials, MISSING_CREDENTIALS};
pub use error::{DecodeErrorKind, Error, ErrorKind, Result};
pub use logger::{LogContext, Logger, LoggerHandle, NullLogger, TracingLogger};
pub use middleware::{
    DeprecationInterceptor, DeprecationNotice, DeprecationSink, ErrorParser, Interceptor,
    RequestLogger,
};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::{Response, ResponseExt};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("MxmApiClient/", env!("CARGO_PKG_VERSION"), " Rust");
