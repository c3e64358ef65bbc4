use crate::errors::IrisError;
use crate::http::common::Endpoint;
use crate::http::gateway;
use crate::media::{MediaInputs, MediaKind, NamedPayload, ReplyPayloadBuilder};
use crate::request::{DecryptRequest, MultipartReplyFields, QueryRequest, ReplyRequest};
use crate::response::GatewayResponse;
use reqwest::Client as ReqwestClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable read by [`Client::from_env`].
pub const ENDPOINT_ENV_VAR: &str = "IRIS_ENDPOINT";

/// The client for talking to an Iris gateway.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) base_url: String,
    #[allow(clippy::struct_field_names)]
    pub(crate) http_client: ReqwestClient,
}

/// Builder for `Client` instances.
///
/// # Example
///
/// ```
/// use iris_client::Client;
/// use std::time::Duration;
///
/// let client = Client::builder("http://127.0.0.1:3000")
///     .timeout(Duration::from_secs(30))
///     .connect_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert_eq!(client.endpoint(), "http://127.0.0.1:3000");
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    endpoint: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Sets the total request timeout, including media downloads.
    ///
    /// If not set, uses reqwest's default (no timeout).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// If not set, uses reqwest's default.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builds the `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`IrisError::InvalidInput`] if the endpoint is not an
    /// `http`/`https` URL, or [`IrisError::ClientBuild`] if the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<Client, IrisError> {
        let base_url = normalize_endpoint(&self.endpoint)?;

        let mut builder = ReqwestClient::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| IrisError::ClientBuild(e.to_string()))?;

        Ok(Client {
            base_url,
            http_client,
        })
    }
}

/// Checks the endpoint is an http(s) URL and strips trailing slashes.
fn normalize_endpoint(endpoint: &str) -> Result<String, IrisError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed).map_err(|e| {
        IrisError::InvalidInput(format!("Invalid Iris endpoint '{endpoint}': {e}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(IrisError::InvalidInput(format!(
            "Iris endpoint '{endpoint}' must use http or https"
        )));
    }
    Ok(trimmed.to_string())
}

impl Client {
    /// Creates a new builder for `Client` instances.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Base URL of the gateway, e.g. `http://127.0.0.1:3000`.
    #[must_use]
    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            endpoint: endpoint.into(),
            timeout: None,
            connect_timeout: None,
        }
    }

    /// Creates a client for the endpoint named by `IRIS_ENDPOINT`.
    ///
    /// # Errors
    ///
    /// Returns [`IrisError::InvalidInput`] if the variable is unset or not a
    /// valid endpoint.
    pub fn from_env() -> Result<Self, IrisError> {
        let endpoint = std::env::var(ENDPOINT_ENV_VAR).map_err(|_| {
            IrisError::InvalidInput(format!("{ENDPOINT_ENV_VAR} environment variable is not set"))
        })?;
        Self::builder(endpoint).build()
    }

    /// The gateway base URL, without a trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    /// A payload builder that downloads through this client's HTTP stack.
    #[must_use]
    pub fn payload_builder(&self, kind: MediaKind) -> ReplyPayloadBuilder<'_> {
        ReplyPayloadBuilder::new(&self.http_client, kind)
    }

    /// Sends a text reply to a room.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP request fails
    /// - The response is not a JSON object
    /// - The gateway answers with a non-2xx status
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use iris_client::Client;
    /// # async fn example() -> Result<(), iris_client::IrisError> {
    /// let client = Client::builder("http://127.0.0.1:3000").build()?;
    /// client.reply(18219201472247343, "pong", None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn reply(
        &self,
        room_id: i64,
        text: impl Into<String>,
        thread_id: Option<i64>,
    ) -> Result<GatewayResponse, IrisError> {
        debug!("Sending text reply to room {room_id}");
        let request = ReplyRequest::text(room_id, text, thread_id);
        gateway::post_json(&self.http_client, &self.base_url, Endpoint::Reply, &request).await
    }

    /// Sends one or more images to a room.
    ///
    /// Each input is converted to bytes (downloaded, read from disk, or PNG
    /// encoded) and sent base64-encoded in a single `image_multiple` reply.
    /// Inputs that fail to convert are logged and skipped.
    ///
    /// Returns `Ok(None)` without contacting the gateway when no input could
    /// be converted.
    ///
    /// # Errors
    ///
    /// Same as [`reply`](Self::reply). Per-image failures are never errors.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use iris_client::{Client, MediaInput};
    /// # async fn example() -> Result<(), iris_client::IrisError> {
    /// let client = Client::builder("http://127.0.0.1:3000").build()?;
    /// client
    ///     .reply_media(
    ///         18219201472247343,
    ///         vec![
    ///             MediaInput::location("https://example.com/cat.png"),
    ///             MediaInput::location("./dog.png"),
    ///         ],
    ///         None,
    ///     )
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn reply_media(
        &self,
        room_id: i64,
        images: impl Into<MediaInputs>,
        thread_id: Option<i64>,
    ) -> Result<Option<GatewayResponse>, IrisError> {
        self.send_media(MediaKind::Image, room_id, images.into(), thread_id)
            .await
    }

    /// Sends one or more audio files to a room as a multipart reply.
    ///
    /// The reply type is `audio` for a single payload and `audio_multiple`
    /// otherwise. Returns `Ok(None)` without contacting the gateway when no
    /// input could be converted.
    ///
    /// # Errors
    ///
    /// Same as [`reply`](Self::reply).
    pub async fn reply_audio(
        &self,
        room_id: i64,
        files: impl Into<MediaInputs>,
        thread_id: Option<i64>,
    ) -> Result<Option<GatewayResponse>, IrisError> {
        self.send_media(MediaKind::Audio, room_id, files.into(), thread_id)
            .await
    }

    /// Sends one or more videos to a room as a multipart reply.
    ///
    /// See [`reply_audio`](Self::reply_audio); the types are `video` and
    /// `video_multiple`.
    ///
    /// # Errors
    ///
    /// Same as [`reply`](Self::reply).
    pub async fn reply_video(
        &self,
        room_id: i64,
        files: impl Into<MediaInputs>,
        thread_id: Option<i64>,
    ) -> Result<Option<GatewayResponse>, IrisError> {
        self.send_media(MediaKind::Video, room_id, files.into(), thread_id)
            .await
    }

    /// Sends one or more arbitrary files to a room as a multipart reply.
    ///
    /// See [`reply_audio`](Self::reply_audio); the types are `file` and
    /// `file_multiple`.
    ///
    /// # Errors
    ///
    /// Same as [`reply`](Self::reply).
    pub async fn reply_file(
        &self,
        room_id: i64,
        files: impl Into<MediaInputs>,
        thread_id: Option<i64>,
    ) -> Result<Option<GatewayResponse>, IrisError> {
        self.send_media(MediaKind::File, room_id, files.into(), thread_id)
            .await
    }

    /// Converts `inputs` and sends them as one reply: base64 JSON for
    /// images, multipart for everything else.
    async fn send_media(
        &self,
        kind: MediaKind,
        room_id: i64,
        inputs: MediaInputs,
        thread_id: Option<i64>,
    ) -> Result<Option<GatewayResponse>, IrisError> {
        let payloads = self.payload_builder(kind).build(inputs).await;
        if payloads.is_empty() {
            warn!("No valid {kind} inputs; not sending reply to room {room_id}");
            return Ok(None);
        }

        let response = if kind.is_multipart() {
            let fields =
                MultipartReplyFields::new(kind.reply_type(payloads.len()), room_id, thread_id);
            debug!(
                "Sending {} {kind} file(s) to room {room_id} as '{}'",
                payloads.len(),
                fields.reply_type
            );
            gateway::post_multipart(&self.http_client, &self.base_url, &fields, payloads).await?
        } else {
            debug!("Sending {} image(s) to room {room_id}", payloads.len());
            let encoded = payloads.iter().map(NamedPayload::to_base64).collect();
            let request = ReplyRequest::images(room_id, encoded, thread_id);
            gateway::post_json(&self.http_client, &self.base_url, Endpoint::Reply, &request)
                .await?
        };
        Ok(Some(response))
    }

    /// Asks the gateway to decrypt a message or attachment payload.
    ///
    /// # Arguments
    ///
    /// * `enc` - Encryption type reported alongside the payload.
    /// * `b64_ciphertext` - The base64 ciphertext.
    /// * `user_id` - ID of the user whose key encrypted the payload.
    ///
    /// Returns the `plain_text` field, or `None` if the gateway sent none.
    ///
    /// # Errors
    ///
    /// Same as [`reply`](Self::reply).
    pub async fn decrypt(
        &self,
        enc: i32,
        b64_ciphertext: &str,
        user_id: i64,
    ) -> Result<Option<String>, IrisError> {
        debug!("Decrypting payload: enc={enc}, user_id={user_id}");
        let request = DecryptRequest {
            enc,
            b64_ciphertext: b64_ciphertext.to_string(),
            user_id,
        };
        let response =
            gateway::post_json(&self.http_client, &self.base_url, Endpoint::Decrypt, &request)
                .await?;
        Ok(response
            .get("plain_text")
            .and_then(Value::as_str)
            .map(String::from))
    }

    /// Runs a SQL query against the gateway database.
    ///
    /// `bind` supplies positional parameters; `None` sends an empty list.
    /// Returns the `data` rows, or an empty list when the response has none.
    ///
    /// # Errors
    ///
    /// Same as [`reply`](Self::reply), plus [`IrisError::Json`] if `data` is
    /// not a list.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use iris_client::Client;
    /// # use serde_json::json;
    /// # async fn example() -> Result<(), iris_client::IrisError> {
    /// let client = Client::builder("http://127.0.0.1:3000").build()?;
    /// let rows = client
    ///     .query("SELECT * FROM chat_logs WHERE chat_id = ? LIMIT 5", Some(vec![json!(42)]))
    ///     .await?;
    /// println!("{} rows", rows.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn query(
        &self,
        query: &str,
        bind: Option<Vec<Value>>,
    ) -> Result<Vec<Value>, IrisError> {
        self.query_as(query, bind).await
    }

    /// Like [`query`](Self::query), with each row deserialized into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`query`](Self::query), plus [`IrisError::Json`] if a row does
    /// not match `T`.
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        query: &str,
        bind: Option<Vec<Value>>,
    ) -> Result<Vec<T>, IrisError> {
        debug!("Running query: {query}");
        let request = QueryRequest {
            query: query.to_string(),
            bind: bind.unwrap_or_default(),
        };
        let mut response =
            gateway::post_json(&self.http_client, &self.base_url, Endpoint::Query, &request)
                .await?;

        match response.take("data") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => Ok(serde_json::from_value(data)?),
        }
    }

    /// Fetches the gateway configuration (`GET /config`).
    ///
    /// # Errors
    ///
    /// Same as [`reply`](Self::reply).
    pub async fn get_info(&self) -> Result<GatewayResponse, IrisError> {
        gateway::get(&self.http_client, &self.base_url, Endpoint::Config).await
    }

    /// Fetches the gateway AOT information (`GET /aot`).
    ///
    /// # Errors
    ///
    /// Same as [`reply`](Self::reply).
    pub async fn get_aot(&self) -> Result<GatewayResponse, IrisError> {
        gateway::get(&self.http_client, &self.base_url, Endpoint::Aot).await
    }
}
