//! # maxemail
//!
//! A client library for the Maxemail JSON API.
//!
//! Every Maxemail service is reached by name and every method is proxied, so
//! the library needs no updates when the API grows new calls.
//!
//! ## Security
//!
//! - Tokens and passwords are redacted in Debug output
//! - Tracing skips credential parameters and request bodies
//! - Error messages built from response bodies have credentials scrubbed
//!
//! ## Crates
//!
//! - **maxemail-client** - HTTP transport: auth headers, JSON codec, interceptors, errors
//! - **maxemail-rpc** - Client facade, service proxies, file upload/download
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use maxemail::{Client, Credentials};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::from_env()?;
//!
//!     let lists = client
//!         .service("list")?
//!         .invoke("fetchAll", &[json!({"sort": "name"})])
//!         .await?;
//!
//!     for list in lists.as_array().into_iter().flatten() {
//!         println!("{}", list["name"]);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
pub use maxemail_client as client;
pub use maxemail_rpc as rpc;

// Re-export commonly used types at the top level
pub use maxemail_rpc::{
    Client, ClientBuilder, ClientConfig, ClientOptions, Credentials, DeprecationNotice,
    DownloadOptions, DownloadType, Error, ErrorKind, FileTransfer, Logger, NullLogger, Result,
    Service, TracingLogger,
};

// RPC arguments and results are plain JSON values
pub use serde_json::{json, Value};
