//! # iris-client
//!
//! A Rust client library for the Iris chat-bot gateway.
//!
//! Iris exposes a messaging client over HTTP. This crate wraps that API:
//! text, image, audio, video and file replies, payload decryption, SQL
//! queries against the client database, and configuration lookups.
//!
//! ## Media replies
//!
//! Media can be given as raw bytes, an async reader, a decoded
//! [`image::DynamicImage`], a URL or a local path (see [`MediaInput`]).
//! Images travel base64-encoded in a JSON body; audio, video and files
//! travel as multipart parts. An input that cannot be loaded is logged and
//! skipped; when none can, the reply is not sent and the method returns
//! `Ok(None)`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use iris_client::{Client, MediaInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder("http://127.0.0.1:3000").build()?;
//!     let room_id = 18219201472247343;
//!
//!     client.reply(room_id, "Hello from Rust!", None).await?;
//!
//!     client
//!         .reply_audio(room_id, MediaInput::location("./greeting.mp3"), None)
//!         .await?;
//!
//!     let rows = client.query("SELECT COUNT(*) AS n FROM chat_logs", None).await?;
//!     println!("{rows:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Debugging
//!
//! Set `IRIS_LOUD_WIRE=1` to dump every request and response to stderr.

pub(crate) mod http;

mod client;
mod errors;
pub mod media;
mod request;
mod response;
mod types;

pub use client::{Client, ClientBuilder, ENDPOINT_ENV_VAR};
pub use errors::{IrisError, PayloadError};
pub use media::{
    BuildReport, MediaInput, MediaInputs, MediaKind, NamedPayload, OCTET_STREAM_MIME, PNG_MIME,
    ReplyPayloadBuilder,
};
pub use request::{DecryptRequest, MultipartReplyFields, QueryRequest, ReplyData, ReplyRequest};
pub use response::GatewayResponse;
pub use types::IrisRequest;
