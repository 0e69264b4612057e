//! HTTP response handling.
//!
//! A [`Response`] starts out streaming. Interceptors that need the body (the
//! error parser, debug logging) buffer it, after which it can still be read
//! again by later stages.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};
use crate::sanitize::sanitize_message;

/// Internal response representation.
#[derive(Debug)]
enum InnerResponse {
    Streaming(reqwest::Response),
    Buffered(BufferedResponse),
}

#[derive(Debug)]
struct BufferedResponse {
    status: u16,
    version: reqwest::Version,
    headers: HeaderMap,
    body: Option<Bytes>,
}

/// Wrapper around an HTTP response.
#[derive(Debug)]
pub struct Response {
    inner: InnerResponse,
}

impl Response {
    /// Create a new Response from a reqwest::Response.
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self {
            inner: InnerResponse::Streaming(inner),
        }
    }

    /// Build an already-buffered response from its parts.
    pub fn from_parts(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            inner: InnerResponse::Buffered(BufferedResponse {
                status,
                version: reqwest::Version::HTTP_11,
                headers,
                body: Some(body.into()),
            }),
        }
    }

    fn headers(&self) -> &HeaderMap {
        match &self.inner {
            InnerResponse::Streaming(resp) => resp.headers(),
            InnerResponse::Buffered(resp) => &resp.headers,
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        match &self.inner {
            InnerResponse::Streaming(resp) => resp.status().as_u16(),
            InnerResponse::Buffered(resp) => resp.status,
        }
    }

    /// HTTP version of the exchange.
    pub fn version(&self) -> reqwest::Version {
        match &self.inner {
            InnerResponse::Streaming(resp) => resp.version(),
            InnerResponse::Buffered(resp) => resp.version,
        }
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// Returns true if the body has been read into memory.
    pub fn is_buffered(&self) -> bool {
        matches!(self.inner, InnerResponse::Buffered(_))
    }

    /// Get the first value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)?.to_str().ok()
    }

    /// Get every value of a repeated header, in order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers()
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body length, from the buffer or the Content-Length header.
    pub fn content_length(&self) -> Option<u64> {
        match &self.inner {
            InnerResponse::Streaming(resp) => resp.content_length(),
            InnerResponse::Buffered(resp) => {
                resp.body.as_ref().map(|body| body.len() as u64)
            }
        }
    }

    /// Buffered body, if the response has been buffered.
    pub fn buffered_body(&self) -> Option<&Bytes> {
        match &self.inner {
            InnerResponse::Buffered(resp) => resp.body.as_ref(),
            InnerResponse::Streaming(_) => None,
        }
    }

    /// Read the whole body into memory, keeping status and headers.
    pub async fn buffer(self) -> Result<Response> {
        match self.inner {
            InnerResponse::Buffered(_) => Ok(self),
            InnerResponse::Streaming(resp) => {
                let status = resp.status().as_u16();
                let version = resp.version();
                let headers = resp.headers().clone();
                let body = resp.bytes().await?;
                Ok(Response {
                    inner: InnerResponse::Buffered(BufferedResponse {
                        status,
                        version,
                        headers,
                        body: Some(body),
                    }),
                })
            }
        }
    }

    /// Next chunk of the body, or `None` once it is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        match &mut self.inner {
            InnerResponse::Streaming(resp) => resp.chunk().await.map_err(Into::into),
            InnerResponse::Buffered(resp) => Ok(resp.body.take().filter(|b| !b.is_empty())),
        }
    }

    /// Get the response body as bytes.
    pub async fn bytes(self) -> Result<Bytes> {
        match self.inner {
            InnerResponse::Streaming(resp) => resp.bytes().await.map_err(Into::into),
            InnerResponse::Buffered(resp) => Ok(resp.body.unwrap_or_default()),
        }
    }

    /// Get the response body as text (lossy for invalid UTF-8).
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Decode the body with the JSON codec.
    pub async fn decode(self) -> Result<Value> {
        let bytes = self.bytes().await?;
        crate::json::decode_slice(&bytes)
    }

    /// Deserialize the body into a typed value.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }
}

/// Extension trait for turning error statuses into errors.
pub trait ResponseExt {
    /// Raise [`ErrorKind::Http`] for any status >= 400.
    fn check_status(self) -> impl std::future::Future<Output = Result<Response>> + Send;
}

impl ResponseExt for Response {
    async fn check_status(self) -> Result<Response> {
        let status = self.status();
        if status < 400 {
            return Ok(self);
        }

        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status");
        let body = self.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            reason.to_string()
        } else {
            format!("{} response: {}", reason, sanitize_message(&body))
        };

        Err(Error::new(ErrorKind::Http { status, message }))
    }
}
