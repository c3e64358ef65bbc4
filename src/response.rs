//! Parsed gateway responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object returned by the gateway.
///
/// The gateway has no fixed response schema. Most endpoints answer with some
/// combination of `data` and `message`; everything else is reachable through
/// [`get`](Self::get).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayResponse(Map<String, Value>);

impl GatewayResponse {
    /// The `data` field, if present.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.0.get("data")
    }

    /// The `message` field, if present and a string.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Removes and returns a field, leaving the rest of the response intact.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }
}

impl From<Map<String, Value>> for GatewayResponse {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
