//! Proxy for one Maxemail service.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use maxemail_client::{json, MxmHttpClient, Result};

/// A named Maxemail service, e.g. `folder` or `list`.
///
/// Any method name can be invoked; arguments are positional.
///
/// # Example
///
/// ```rust,ignore
/// let folder = client.service("folder")?;
/// let root = folder.invoke("fetchRoot", &[json!("email")]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Service {
    name: String,
    http: Arc<MxmHttpClient>,
}

impl Service {
    pub fn new(name: impl Into<String>, http: Arc<MxmHttpClient>) -> Self {
        Self {
            name: name.into(),
            http,
        }
    }

    /// The service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call `method` with positional arguments and decode the JSON result.
    #[instrument(skip(self, args), fields(service = %self.name, args = args.len()))]
    pub async fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        let fields = encode_call(method, args)?;
        let path = urlencoding::encode(&self.name).into_owned();
        let request = self.http.post(path).form(&fields)?;

        let body = self.http.execute(request).await?.bytes().await?;
        json::decode_slice(&body)
    }

    /// Like [`invoke`](Self::invoke), deserializing into `T`.
    pub async fn invoke_as<T: DeserializeOwned>(&self, method: &str, args: &[Value]) -> Result<T> {
        let value = self.invoke(method, args).await?;
        serde_json::from_value(value).map_err(Into::into)
    }
}

/// Build the ordered form fields `method, arg0, arg1, ...`.
///
/// Arrays and objects are sent as JSON text, booleans as `1`/`0`. `null`
/// arguments are left out without renumbering the rest.
pub(crate) fn encode_call(method: &str, args: &[Value]) -> Result<Vec<(String, String)>> {
    let mut fields = Vec::with_capacity(args.len() + 1);
    fields.push(("method".to_string(), method.to_string()));

    for (index, arg) in args.iter().enumerate() {
        let value = match arg {
            Value::Null => continue,
            Value::Bool(flag) => u8::from(*flag).to_string(),
            Value::Number(number) => number.to_string(),
            Value::String(text) => text.clone(),
            Value::Array(_) | Value::Object(_) => json::encode(arg)?,
        };
        fields.push((format!("arg{}", index), value));
    }

    Ok(fields)
}
