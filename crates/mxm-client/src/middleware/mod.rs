//! Request/response interceptors.
//!
//! The transport runs every registered [`Interceptor`] around each exchange:
//! `on_request` just before the request is sent, `on_response` in registration
//! order once the response headers arrive. An interceptor may pass the response
//! through, buffer and rebuild it, or turn it into an error.

use std::fmt;

use futures::future::BoxFuture;
use url::Url;

use crate::error::Result;
use crate::request::RequestBuilder;
use crate::response::Response;

mod deprecation;
mod error_parser;
mod logging;

pub use deprecation::{DeprecationInterceptor, DeprecationNotice, DeprecationSink, WarningValue};
pub use error_parser::ErrorParser;
pub use logging::RequestLogger;

/// A hook around the HTTP exchange.
pub trait Interceptor: Send + Sync + fmt::Debug {
    /// Short name used in tracing output.
    fn name(&self) -> &'static str;

    /// Observe an outgoing request.
    fn on_request(&self, _request: &RequestBuilder, _url: &Url) {}

    /// Inspect, replace or reject a response.
    fn on_response<'a>(&'a self, response: Response) -> BoxFuture<'a, Result<Response>>;
}
