use super::common::{Endpoint, construct_endpoint_url};
use super::error_helpers::parse_gateway_body;
use super::loud_wire;
use crate::errors::IrisError;
use crate::media::NamedPayload;
use crate::request::MultipartReplyFields;
use crate::response::GatewayResponse;
use reqwest::Client as ReqwestClient;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{debug, warn};

/// Name of the form part every file is sent under.
const FILE_PART_NAME: &str = "file";

/// Sends a JSON body to a gateway endpoint.
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP request fails
/// - The response body is not a JSON object
/// - The response status is outside `200..=299`
pub async fn post_json<T: Serialize + ?Sized>(
    http_client: &ReqwestClient,
    base_url: &str,
    endpoint: Endpoint,
    body: &T,
) -> Result<GatewayResponse, IrisError> {
    let url = construct_endpoint_url(base_url, endpoint);

    let request_id = loud_wire::next_request_id();
    if loud_wire::is_enabled() {
        match serde_json::to_string(body) {
            Ok(json) => loud_wire::log_request(request_id, endpoint.method(), &url, Some(&json)),
            Err(e) => warn!("IRIS_LOUD_WIRE: Failed to serialize request body: {}", e),
        }
    }

    let response = http_client.post(&url).json(body).send().await?;
    finish(request_id, response).await
}

/// Sends a GET to a gateway endpoint.
///
/// # Errors
///
/// Same as [`post_json`].
pub async fn get(
    http_client: &ReqwestClient,
    base_url: &str,
    endpoint: Endpoint,
) -> Result<GatewayResponse, IrisError> {
    let url = construct_endpoint_url(base_url, endpoint);

    let request_id = loud_wire::next_request_id();
    loud_wire::log_request(request_id, endpoint.method(), &url, None);

    let response = http_client.get(&url).send().await?;
    finish(request_id, response).await
}

/// Sends text fields plus one `file` part per payload to `/reply/multipart`.
///
/// # Errors
///
/// Same as [`post_json`], plus an error if a payload's content type is not a
/// valid MIME type.
pub async fn post_multipart(
    http_client: &ReqwestClient,
    base_url: &str,
    fields: &MultipartReplyFields,
    payloads: Vec<NamedPayload>,
) -> Result<GatewayResponse, IrisError> {
    let url = construct_endpoint_url(base_url, Endpoint::ReplyMultipart);

    let request_id = loud_wire::next_request_id();
    let pairs = fields.pairs();
    if loud_wire::is_enabled() {
        let parts: Vec<_> = payloads
            .iter()
            .map(|p| (p.filename.as_str(), p.content_type.as_str(), p.bytes.len()))
            .collect();
        loud_wire::log_multipart(request_id, &url, &pairs, &parts);
    }

    let mut form = Form::new();
    for (name, value) in pairs {
        form = form.text(name, value.to_string());
    }
    for payload in payloads {
        let part = Part::bytes(payload.bytes.to_vec())
            .file_name(payload.filename)
            .mime_str(&payload.content_type)?;
        form = form.part(FILE_PART_NAME, part);
    }

    let response = http_client.post(&url).multipart(form).send().await?;
    finish(request_id, response).await
}

async fn finish(
    request_id: usize,
    response: reqwest::Response,
) -> Result<GatewayResponse, IrisError> {
    let status = response.status().as_u16();
    loud_wire::log_response_status(request_id, status);
    debug!("Gateway answered with HTTP {}", status);

    let text = response.text().await?;
    loud_wire::log_response_body(request_id, &text);
    parse_gateway_body(status, &text)
}
