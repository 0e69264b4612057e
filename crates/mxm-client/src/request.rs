//! HTTP request building.

use std::collections::HashMap;

use crate::error::Result;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
        }
    }
}

/// Builder for a request against the API base URL.
///
/// `path` is resolved against the transport's base URL, so `"folder"` targets
/// `.../api/json/folder` while `"/download/..."` targets the host root.
#[derive(Debug)]
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) path: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Option<RequestBody>,
    pub(crate) version: reqwest::Version,
}

/// Request body content.
#[derive(Debug)]
pub enum RequestBody {
    /// Pre-encoded `application/x-www-form-urlencoded` body.
    Form(String),
    Multipart(reqwest::multipart::Form),
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
            version: reqwest::Version::HTTP_11,
        }
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP version the request is sent with.
    pub fn version(&self) -> reqwest::Version {
        self.version
    }

    /// Look up a header set on this request (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Add a header, overriding the transport default of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Override the `Accept` header.
    pub fn accept(self, value: impl Into<String>) -> Self {
        self.header("Accept", value)
    }

    /// Set a form body; fields are encoded in the given order.
    pub fn form<K: AsRef<str>, V: AsRef<str>>(mut self, fields: &[(K, V)]) -> Result<Self> {
        let pairs: Vec<(&str, &str)> = fields
            .iter()
            .map(|(key, value)| (key.as_ref(), value.as_ref()))
            .collect();
        let encoded = serde_urlencoded::to_string(pairs)?;
        self.body = Some(RequestBody::Form(encoded));
        self.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        Ok(self)
    }

    /// Set a multipart body. The boundary content type is set by the transport.
    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self.headers
            .retain(|name, _| !name.eq_ignore_ascii_case("Content-Type"));
        self
    }

    /// Printable rendition of the body, for debug logging.
    pub fn body_summary(&self) -> String {
        match &self.body {
            Some(RequestBody::Form(encoded)) => encoded.clone(),
            Some(RequestBody::Multipart(form)) => {
                format!("[multipart/form-data; boundary={}]", form.boundary())
            }
            None => String::new(),
        }
    }
}
