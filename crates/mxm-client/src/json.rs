//! JSON codec used for RPC results and error bodies.
//!
//! Decoding yields a dynamic [`Value`]; object key order is preserved. Failures
//! are classified into a [`DecodeErrorKind`] and reported with the offending
//! text so a bad response can be diagnosed from the error alone.

use serde_json::Value;

use crate::error::{DecodeErrorKind, Error, ErrorKind, Result};
use crate::sanitize::sanitize_message;

/// Decode JSON text into a dynamic value.
pub fn decode(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|err| {
        let kind = classify(&err);
        decode_error(kind, text, err)
    })
}

/// Decode a raw response body, rejecting invalid UTF-8 up front.
pub fn decode_slice(bytes: &[u8]) -> Result<Value> {
    match std::str::from_utf8(bytes) {
        Ok(text) => decode(text),
        Err(err) => Err(decode_error(
            DecodeErrorKind::Utf8,
            &String::from_utf8_lossy(bytes),
            err,
        )),
    }
}

/// Encode a value as compact JSON text.
pub fn encode(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

fn decode_error(
    kind: DecodeErrorKind,
    text: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> Error {
    Error::with_source(
        ErrorKind::Decode {
            kind,
            message: format!(
                "Problem decoding JSON : {} : '{}'",
                kind,
                sanitize_message(text)
            ),
        },
        source,
    )
}

/// Map a serde_json failure onto the decode error taxonomy.
fn classify(err: &serde_json::Error) -> DecodeErrorKind {
    use serde_json::error::Category;

    let message = err.to_string();
    if message.contains("recursion limit exceeded") {
        return DecodeErrorKind::MaxDepth;
    }
    if message.contains("control character") {
        return DecodeErrorKind::ControlCharacter;
    }
    if message.contains("unicode code point")
        || message.contains("surrogate")
        || message.contains("hex escape")
    {
        return DecodeErrorKind::Utf16;
    }
    if message.contains("expected `,` or `]`")
        || message.contains("expected `,` or `}`")
        || message.contains("expected `:`")
        || message.contains("key must be a string")
    {
        return DecodeErrorKind::Malformed;
    }

    match err.classify() {
        Category::Syntax | Category::Eof => DecodeErrorKind::Syntax,
        Category::Io | Category::Data => DecodeErrorKind::Unknown,
    }
}
