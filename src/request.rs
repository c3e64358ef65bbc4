//! Request bodies sent to the Iris gateway.

use serde::Serialize;
use serde_json::Value;

/// Body of a `POST /reply` call.
///
/// Room and thread IDs travel as strings on the wire.
///
/// # Example
///
/// ```
/// use iris_client::ReplyRequest;
///
/// let request = ReplyRequest::text(42, "hi", None);
/// assert_eq!(
///     serde_json::to_string(&request).unwrap(),
///     r#"{"type":"text","room":"42","data":"hi"}"#
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplyRequest {
    #[serde(rename = "type")]
    pub reply_type: String,
    pub room: String,
    pub data: ReplyData,
    #[serde(rename = "threadId", skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// The `data` field of a [`ReplyRequest`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyData {
    Text(String),
    /// Base64-encoded images
    Images(Vec<String>),
}

impl ReplyRequest {
    /// A plain text reply.
    pub fn text(room_id: i64, text: impl Into<String>, thread_id: Option<i64>) -> Self {
        Self {
            reply_type: "text".to_string(),
            room: room_id.to_string(),
            data: ReplyData::Text(text.into()),
            thread_id: thread_id.map(|id| id.to_string()),
        }
    }

    /// An image reply carrying already base64-encoded images.
    pub fn images(room_id: i64, images: Vec<String>, thread_id: Option<i64>) -> Self {
        Self {
            reply_type: "image_multiple".to_string(),
            room: room_id.to_string(),
            data: ReplyData::Images(images),
            thread_id: thread_id.map(|id| id.to_string()),
        }
    }
}

/// Text fields of a `POST /reply/multipart` call. The file parts are added
/// separately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipartReplyFields {
    pub reply_type: String,
    pub room: String,
    pub thread_id: Option<String>,
}

impl MultipartReplyFields {
    #[must_use]
    pub fn new(reply_type: impl Into<String>, room_id: i64, thread_id: Option<i64>) -> Self {
        Self {
            reply_type: reply_type.into(),
            room: room_id.to_string(),
            thread_id: thread_id.map(|id| id.to_string()),
        }
    }

    /// Field name/value pairs in the order they go into the form.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("type", self.reply_type.as_str()), ("room", self.room.as_str())];
        if let Some(thread_id) = &self.thread_id {
            pairs.push(("threadId", thread_id.as_str()));
        }
        pairs
    }
}

/// Body of a `POST /decrypt` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecryptRequest {
    pub enc: i32,
    pub b64_ciphertext: String,
    pub user_id: i64,
}

/// Body of a `POST /query` call. `bind` is always sent, empty when there
/// are no parameters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub bind: Vec<Value>,
}
