//! Common test utilities shared across all integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Mock Gateway
//!
//! [`MockGateway`] runs an in-process HTTP server standing in for Iris. It
//! records every request that is not a media download (JSON bodies, multipart
//! fields and file parts) and answers with a configurable status and body.
//! Files registered with [`MockGateway::serve_media`] are downloadable under
//! `/media/<name>`; other media names answer 404.

#![allow(dead_code)]

use axum::Router;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use iris_client::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 1x1 red PNG, base64-encoded.
pub const TINY_RED_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

/// A file part received by the mock gateway.
#[derive(Debug, Clone)]
pub struct CapturedFile {
    pub field: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A request received by the mock gateway.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub json: Option<Value>,
    pub fields: Vec<(String, String)>,
    pub files: Vec<CapturedFile>,
}

impl CapturedRequest {
    /// Value of a multipart text field, if sent.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> &Value {
        self.json.as_ref().expect("request had no JSON body")
    }
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    response: Arc<Mutex<(u16, String)>>,
    media: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

/// An in-process stand-in for the Iris gateway.
pub struct MockGateway {
    pub base_url: String,
    state: MockState,
}

impl MockGateway {
    /// Starts the server on an ephemeral port. It answers
    /// `200 {"success":true}` until told otherwise.
    pub async fn start() -> Self {
        let state = MockState {
            requests: Arc::new(Mutex::new(Vec::new())),
            response: Arc::new(Mutex::new((200, r#"{"success":true}"#.to_string()))),
            media: Arc::new(Mutex::new(HashMap::new())),
        };

        let app = Router::new()
            .route("/media/:name", get(serve_media))
            .fallback(record)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock gateway");
        let addr = listener.local_addr().expect("Mock gateway has no address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock gateway stopped");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// A client pointed at this gateway.
    pub fn client(&self) -> Client {
        Client::builder(&self.base_url)
            .build()
            .expect("Failed to build client")
    }

    /// Sets the status and raw body of every following gateway response.
    pub fn respond_with(&self, status: u16, body: &str) {
        *self.state.response.lock().unwrap() = (status, body.to_string());
    }

    /// Makes `bytes` downloadable at [`media_url(name)`](Self::media_url).
    pub fn serve_media(&self, name: &str, bytes: &[u8]) {
        self.state
            .media
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
    }

    /// URL of a media file; `name` may be percent-encoded.
    pub fn media_url(&self, name: &str) -> String {
        format!("{}/media/{}", self.base_url, name)
    }

    /// Gateway requests received so far (media downloads excluded).
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// The only gateway request received, panicking if there were more or none.
    pub fn single_request(&self) -> CapturedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "Expected exactly one gateway request, got {:?}", requests);
        requests.into_iter().next().unwrap()
    }
}

async fn serve_media(State(state): State<MockState>, Path(name): Path<String>) -> Response {
    let bytes = state.media.lock().unwrap().get(&name).cloned();
    match bytes {
        Some(bytes) => (StatusCode::OK, bytes).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn record(State(state): State<MockState>, request: Request) -> Response {
    let mut captured = CapturedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        json: None,
        fields: Vec::new(),
        files: Vec::new(),
    };

    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &state)
            .await
            .expect("Invalid multipart body");
        while let Some(field) = multipart.next_field().await.expect("Invalid multipart field") {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.expect("Failed to read multipart field");

            if filename.is_some() {
                captured.files.push(CapturedFile {
                    field: name,
                    filename,
                    content_type,
                    bytes: data.to_vec(),
                });
            } else {
                captured
                    .fields
                    .push((name, String::from_utf8_lossy(&data).into_owned()));
            }
        }
    } else {
        let body = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .expect("Failed to read request body");
        if !body.is_empty() {
            captured.json = serde_json::from_slice(&body).ok();
        }
    }

    state.requests.lock().unwrap().push(captured);

    let (status, body) = state.response.lock().unwrap().clone();
    let status = StatusCode::from_u16(status).expect("Invalid mock status");
    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}
