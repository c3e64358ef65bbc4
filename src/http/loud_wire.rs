//! Wire-level debugging via the `IRIS_LOUD_WIRE` environment variable.
//!
//! When `IRIS_LOUD_WIRE` is set to any value, prints every gateway request
//! and response to stderr with pretty formatting and colors.
//!
//! # Usage
//!
//! ```bash
//! IRIS_LOUD_WIRE=1 cargo run --example reply_media
//! ```
//!
//! # Output Format
//!
//! - Green `>>>` for outgoing requests
//! - Red `<<<` for incoming responses
//! - Magenta `PART` lines for multipart file parts (name, type, size)
//! - Timestamps and request IDs for correlation
//!
//! Base64 image data in `data` fields is truncated to keep output readable.

use colored::Colorize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Request ID counter for correlating requests with responses
static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Cached check for whether IRIS_LOUD_WIRE is enabled
static ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if wire debugging is enabled.
///
/// The result is cached after the first check, so `IRIS_LOUD_WIRE` must be
/// set before the first gateway call.
#[must_use]
pub fn is_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("IRIS_LOUD_WIRE").is_ok())
}

/// Get the next request ID for correlation.
#[must_use]
pub fn next_request_id() -> usize {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Fields whose base64-looking strings are truncated.
const TRUNCATE_FIELDS: &[&str] = &["data", "b64_ciphertext"];

/// Maximum length before truncation (keep first 100 chars).
const TRUNCATE_THRESHOLD: usize = 100;

fn looks_like_base64(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

fn truncate_string(s: &mut String) {
    if s.len() > TRUNCATE_THRESHOLD && looks_like_base64(s) {
        *s = format!("{}...", &s[..TRUNCATE_THRESHOLD]);
    }
}

/// Truncate long base64 strings in a JSON value.
///
/// Walks the JSON tree. Under a `data` or `b64_ciphertext` key, strings (and
/// strings directly inside arrays) longer than 100 characters that look like
/// base64 are cut. Text replies and query rows are left intact.
fn truncate_long_fields(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if TRUNCATE_FIELDS.contains(&key.as_str()) {
                    match val {
                        serde_json::Value::String(s) => truncate_string(s),
                        serde_json::Value::Array(items) => {
                            for item in items.iter_mut() {
                                if let serde_json::Value::String(s) = item {
                                    truncate_string(s);
                                } else {
                                    truncate_long_fields(item);
                                }
                            }
                        }
                        other => truncate_long_fields(other),
                    }
                } else {
                    truncate_long_fields(val);
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                truncate_long_fields(item);
            }
        }
        _ => {}
    }
}

/// Colorize and format JSON for terminal output.
fn colorize_json(value: &serde_json::Value) -> Option<String> {
    colored_json::to_colored_json_auto(value).ok()
}

fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Log prefix with timestamp and request ID.
fn prefix(request_id: usize) -> String {
    let ts = timestamp().dimmed();
    format!(
        "{} {} {}",
        "[IRIS_WIRE]".bold(),
        ts,
        format!("[REQ#{}]", request_id).cyan()
    )
}

fn print_json(prefix: &str, label: &str, mut parsed: serde_json::Value) {
    truncate_long_fields(&mut parsed);
    eprintln!("{prefix} {label}:");
    if let Some(colored) = colorize_json(&parsed) {
        for line in colored.lines() {
            eprintln!("{prefix} {line}");
        }
    } else if let Ok(pretty) = serde_json::to_string_pretty(&parsed) {
        for line in pretty.lines() {
            eprintln!("{prefix} {line}");
        }
    }
}

/// Log an outgoing HTTP request.
pub fn log_request(request_id: usize, method: &str, url: &str, body: Option<&str>) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = ">>>".green().bold();

    eprintln!("{prefix} {direction} {method} {url}");

    if let Some(body) = body {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(parsed) => print_json(&prefix, &"Body".green().to_string(), parsed),
            Err(_) => eprintln!("{prefix} {}: {body}", "Body".green()),
        }
    }
}

/// Log the text fields and file parts of an outgoing multipart request.
pub fn log_multipart(
    request_id: usize,
    url: &str,
    fields: &[(&str, &str)],
    parts: &[(&str, &str, usize)],
) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = ">>>".green().bold();

    eprintln!("{prefix} {direction} POST (multipart) {url}");
    for (name, value) in fields {
        eprintln!("{prefix} {} {name}={value}", "FIELD".green());
    }
    for (filename, content_type, size) in parts {
        eprintln!(
            "{prefix} {} file \"{filename}\" ({content_type}, {size} bytes)",
            "PART".magenta().bold()
        );
    }
}

/// Log an incoming HTTP response status.
pub fn log_response_status(request_id: usize, status: u16) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = "<<<".red().bold();
    let status_text = if (200..300).contains(&status) {
        format!("{status} OK").green()
    } else {
        format!("{status} ERROR").red()
    };

    eprintln!("{prefix} {direction} {status_text}");
}

/// Log an incoming HTTP response body.
pub fn log_response_body(request_id: usize, body: &str) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(parsed) => print_json(&prefix, &"Response".red().to_string(), parsed),
        Err(_) => {
            let truncated = super::error_helpers::truncate_for_context(body, 1000);
            eprintln!("{prefix} {}: {truncated}", "Response".red());
        }
    }
}
