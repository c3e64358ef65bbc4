use crate::http::error_helpers::{ERROR_BODY_PREVIEW_LENGTH, truncate_for_context};
use crate::media::MediaKind;
use std::path::PathBuf;
use thiserror::Error;

/// Defines errors that can occur when talking to the Iris gateway.
///
/// # Example: Handling Gateway Errors
///
/// ```ignore
/// match client.reply(room_id, "hello", None).await {
///     Err(IrisError::Api { status_code, message }) => {
///         tracing::error!("Iris rejected the reply ({}): {}", status_code, message);
///     }
///     Err(IrisError::MalformedResponse { body, .. }) => {
///         tracing::error!("Iris answered with something that is not JSON: {}", body);
///     }
///     // ...
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrisError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// The gateway answered with a status outside `200..=299`.
    ///
    /// `message` is the `message` field of the response body, or
    /// `"unknown error"` when the body has none.
    #[error("Iris error (HTTP {status_code}): {message}")]
    Api {
        /// HTTP status code (e.g., 400, 404, 500)
        status_code: u16,
        /// Error message from the response body
        message: String,
    },
    /// The gateway answered with a body that is not a JSON object.
    ///
    /// `body` holds the raw response text; only the displayed message is
    /// shortened.
    #[error(
        "Iris response JSON parse error (HTTP {status_code}): {}",
        truncate_for_context(.body, ERROR_BODY_PREVIEW_LENGTH)
    )]
    MalformedResponse {
        /// HTTP status code of the response
        status_code: u16,
        /// Raw response text
        body: String,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Failed to build the HTTP client.
    ///
    /// This typically only occurs in exceptional circumstances such as
    /// TLS backend initialization failures.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Failure to turn a single [`MediaInput`](crate::MediaInput) into a payload.
///
/// These never abort a reply: the offending input is logged and skipped and
/// the remaining inputs are still sent.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PayloadError {
    #[error("unsupported {input} input for {kind} replies")]
    Unsupported {
        kind: MediaKind,
        /// Short name of the rejected input variant
        input: &'static str,
    },
    #[error("download of '{url}' failed with HTTP {status_code}")]
    Download { url: String, status_code: u16 },
    #[error("failed to fetch '{url}': {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read input stream: {0}")]
    Stream(#[source] std::io::Error),
    #[error("failed to encode image as PNG: {0}")]
    Encode(#[from] image::ImageError),
}
