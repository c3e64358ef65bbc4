/// Represents the gateway endpoints this client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Text and image replies (JSON)
    Reply,
    /// Audio, video and file replies (multipart form)
    ReplyMultipart,
    /// Payload decryption
    Decrypt,
    /// SQL query against the gateway database
    Query,
    /// Gateway configuration
    Config,
    /// Authentication/AOT information
    Aot,
}

impl Endpoint {
    /// Constructs the URL path for this endpoint
    const fn to_path(self) -> &'static str {
        match self {
            Self::Reply => "/reply",
            Self::ReplyMultipart => "/reply/multipart",
            Self::Decrypt => "/decrypt",
            Self::Query => "/query",
            Self::Config => "/config",
            Self::Aot => "/aot",
        }
    }

    /// HTTP method the endpoint expects
    pub const fn method(self) -> &'static str {
        match self {
            Self::Config | Self::Aot => "GET",
            Self::Reply | Self::ReplyMultipart | Self::Decrypt | Self::Query => "POST",
        }
    }
}

/// Constructs a URL for a specific endpoint under the gateway base URL.
///
/// The base URL is expected without a trailing slash; the client trims it
/// when built.
#[must_use]
pub fn construct_endpoint_url(base_url: &str, endpoint: Endpoint) -> String {
    format!("{base_url}{}", endpoint.to_path())
}
