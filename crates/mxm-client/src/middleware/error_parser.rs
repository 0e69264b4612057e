use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use tracing::debug;

use super::Interceptor;
use crate::error::{Error, ErrorKind, Result};
use crate::response::Response;

/// Turns 4xx responses carrying `{"msg": "..."}` into [`ErrorKind::Client`].
///
/// Anything else (2xx/3xx, 5xx, or a 4xx body that is not such an object) is
/// passed on unchanged, with the body buffered so the status check can still
/// report it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorParser;

impl ErrorParser {
    async fn parse(response: Response) -> Result<Response> {
        let status = response.status();
        if !(400..500).contains(&status) {
            return Ok(response);
        }

        let response = response.buffer().await?;
        let decoded = response
            .buffered_body()
            .map(|body| crate::json::decode_slice(body));

        if let Some(Ok(Value::Object(map))) = decoded {
            if let Some(Value::String(msg)) = map.get("msg") {
                return Err(Error::new(ErrorKind::Client {
                    status,
                    message: msg.clone(),
                }));
            }
        }

        debug!(status, "Client error without Maxemail error body");
        Ok(response)
    }
}

impl Interceptor for ErrorParser {
    fn name(&self) -> &'static str {
        "mxm-error"
    }

    fn on_response<'a>(&'a self, response: Response) -> BoxFuture<'a, Result<Response>> {
        Self::parse(response).boxed()
    }
}
