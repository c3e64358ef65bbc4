//! Response parsing and error context formatting.

use crate::errors::IrisError;
use crate::response::GatewayResponse;
use serde_json::Value;

/// Maximum characters to include from a response body in error messages
pub(crate) const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

/// Message used when a failed response carries no `message` field.
pub const DEFAULT_ERROR_MESSAGE: &str = "unknown error";

/// Parses a raw gateway body.
///
/// The body is parsed before the status is looked at, so a failed request
/// with an HTML error page is reported as malformed rather than as an API
/// error.
///
/// # Errors
///
/// - [`IrisError::MalformedResponse`] when `text` is not a JSON object
/// - [`IrisError::Api`] when `status_code` is outside `200..=299`
pub fn parse_gateway_body(status_code: u16, text: &str) -> Result<GatewayResponse, IrisError> {
    let malformed = || IrisError::MalformedResponse {
        status_code,
        body: text.to_string(),
    };

    let value: Value = serde_json::from_str(text).map_err(|_| malformed())?;

    if !(200..=299).contains(&status_code) {
        let message = match value.get("message") {
            Some(Value::String(message)) => message.clone(),
            None | Some(Value::Null) => DEFAULT_ERROR_MESSAGE.to_string(),
            Some(other) => other.to_string(),
        };
        return Err(IrisError::Api {
            status_code,
            message,
        });
    }

    match value {
        Value::Object(map) => Ok(GatewayResponse::from(map)),
        _ => Err(malformed()),
    }
}

/// Truncates a string to specified length, adding "..." if truncated.
///
/// Uses character-boundary-aware slicing to prevent panics on multi-byte UTF-8 characters.
pub(crate) fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncate_at = s
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..truncate_at])
    }
}
