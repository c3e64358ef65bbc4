use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An incoming chat message as handed to bot handlers.
///
/// `raw` keeps the full event the gateway delivered, for fields this struct
/// does not lift out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrisRequest {
    /// The message text.
    pub msg: String,
    /// The room (chat) name the message was posted in.
    pub room: String,
    /// Display name of the sender.
    pub sender: String,
    /// The full event as received.
    pub raw: Value,
}

impl IrisRequest {
    /// Looks up a field of the raw event, e.g. `"chat_id"` or `"user_id"`.
    #[must_use]
    pub fn raw_field(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}
