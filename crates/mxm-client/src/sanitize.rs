//! Scrubbing of text that ends up in error messages.

use std::sync::LazyLock;

use regex_lite::Regex;

const MAX_LENGTH: usize = 500;

static BEARER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)bearer\s+[A-Za-z0-9\-._~+/]+=*").unwrap());

static BASIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)basic\s+[A-Za-z0-9+/]{8,}=*").unwrap());

/// Sanitize a message derived from a response body or request data.
///
/// - Redacts bearer tokens and basic-auth blobs
/// - Truncates messages longer than 500 bytes
pub fn sanitize_message(message: &str) -> String {
    let sanitized = BEARER.replace_all(message, "Bearer [REDACTED]");
    let sanitized = BASIC.replace_all(&sanitized, "Basic [REDACTED]");
    truncate(&sanitized)
}

/// Truncate to at most 500 bytes on a char boundary, marking the cut.
pub fn truncate(message: &str) -> String {
    if message.len() <= MAX_LENGTH {
        return message.to_string();
    }

    let mut end = MAX_LENGTH;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    let mut truncated = message[..end].to_string();
    truncated.push_str("...[truncated]");
    truncated
}
