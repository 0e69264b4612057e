//! # maxemail-rpc
//!
//! Client for the Maxemail JSON API.
//!
//! ## Features
//!
//! - **Service proxies** - Call any method of any service by name
//! - **Vendor errors** - 4xx `{"msg": ...}` bodies surface as typed errors
//! - **Deprecation notices** - `Warning: 299` headers are logged and collected
//! - **File transfer** - Upload files for import, download files and exports
//!
//! ## Example
//!
//! ```rust,ignore
//! use maxemail_rpc::{Client, Credentials, DownloadOptions, DownloadType};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), maxemail_rpc::Error> {
//!     let client = Client::builder()
//!         .credentials(Credentials::basic("api@user.com", "apipass"))
//!         .uri("https://mxm.xtremepush.com/")
//!         .build()?;
//!
//!     let root = client
//!         .service("folder")?
//!         .invoke("fetchRoot", &[json!("email")])
//!         .await?;
//!
//!     let helper = client.helper()?;
//!     let key = helper.upload_file("recipients.csv").await?;
//!     let export = helper
//!         .download_file(DownloadType::ListExport, 123, DownloadOptions::default())
//!         .await?;
//!
//!     for notice in client.take_deprecations() {
//!         eprintln!("deprecated: {}", notice.message);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod helper;
mod options;
mod service;

pub use client::{normalize_uri, Client, ClientBuilder, DEFAULT_URI};
pub use helper::{DownloadOptions, DownloadType, FileTransfer};
pub use options::ClientOptions;
pub use service::Service;

// Transport types callers need alongside the client
pub use maxemail_client::{
    ClientConfig, Credentials, DecodeErrorKind, DeprecationNotice, Error, ErrorKind, LogContext,
    Logger, NullLogger, Result, TracingLogger,
};
