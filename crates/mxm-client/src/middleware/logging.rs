use futures::future::BoxFuture;
use futures::FutureExt;
use url::Url;

use super::Interceptor;
use crate::error::Result;
use crate::logger::LoggerHandle;
use crate::request::RequestBuilder;
use crate::response::Response;

/// Debug-level logging of every request line and response body.
///
/// Enabled with the `debug_logging` option. Only textual response bodies are
/// read; binary downloads are reported by size and keep streaming.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    logger: LoggerHandle,
}

impl RequestLogger {
    pub fn new(logger: LoggerHandle) -> Self {
        Self { logger }
    }

    async fn log_response(&self, response: Response) -> Result<Response> {
        let code = response.status();

        if !is_textual(response.content_type()) {
            let size = response
                .content_length()
                .map(|len| format!("{} bytes", len))
                .unwrap_or_else(|| "unknown size".to_string());
            self.logger
                .get()
                .debug(&format!("RESPONSE: {} - [binary body, {}]", code, size), &[]);
            return Ok(response);
        }

        let response = response.buffer().await?;
        let body = response
            .buffered_body()
            .map(|body| String::from_utf8_lossy(body).into_owned())
            .unwrap_or_default();
        self.logger
            .get()
            .debug(&format!("RESPONSE: {} - {}", code, body), &[]);
        Ok(response)
    }
}

fn is_textual(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(value) => {
            let value = value.to_ascii_lowercase();
            value.contains("json") || value.starts_with("text/")
        }
    }
}

impl Interceptor for RequestLogger {
    fn name(&self) -> &'static str {
        "log"
    }

    fn on_request(&self, request: &RequestBuilder, url: &Url) {
        self.logger.get().debug(
            &format!(
                "{}: {} {:?} {}",
                request.method().as_str(),
                url,
                request.version(),
                request.body_summary()
            ),
            &[],
        );
    }

    fn on_response<'a>(&'a self, response: Response) -> BoxFuture<'a, Result<Response>> {
        self.log_response(response).boxed()
    }
}
