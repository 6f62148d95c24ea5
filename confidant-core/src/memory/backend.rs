//! Memory store trait for pluggable long-term memory services
//!
//! The store's write contract mirrors an `add(input, options)` call whose
//! accepted input shape is not documented; see
//! [`PayloadEncoding`](super::PayloadEncoding) for the shapes we try.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One write request as handed to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritePayload {
    /// Text blob, list of role/content records, or a flat object
    pub input: serde_json::Value,

    /// Owner metadata passed alongside the input, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

impl WritePayload {
    /// Owner identifier carried anywhere in the payload.
    ///
    /// Looks at `options.userId`, `options.user_id`, `input.metadata.userId`
    /// and `input.user_id`, in that order.
    pub fn owner_id(&self) -> Option<&str> {
        let from_options = self.options.as_ref().and_then(|o| {
            o.get("userId")
                .or_else(|| o.get("user_id"))
                .and_then(|v| v.as_str())
        });

        from_options
            .or_else(|| {
                self.input
                    .get("metadata")
                    .and_then(|m| m.get("userId"))
                    .and_then(|v| v.as_str())
            })
            .or_else(|| self.input.get("user_id").and_then(|v| v.as_str()))
    }

    /// Text content of the payload, flattening turn lists
    pub fn text(&self) -> Option<String> {
        match &self.input {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let lines: Vec<String> = items
                    .iter()
                    .filter_map(|item| {
                        let role = item.get("role")?.as_str()?;
                        let content = item.get("content")?.as_str()?;
                        Some(format!("{}: {}", role, content))
                    })
                    .collect();
                (!lines.is_empty()).then(|| lines.join("\n"))
            }
            serde_json::Value::Object(map) => map
                .get("text")
                .or_else(|| map.get("memory"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            _ => None,
        }
    }
}

/// The external long-term memory service
///
/// Implementors provide one write and one bulk read. Both are remote calls
/// whose failures surface as persistence errors; timeouts and backoff
/// belong to the implementation's transport.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Write one payload; an error means this shape was rejected
    async fn add(&self, payload: &WritePayload) -> Result<()>;

    /// All records stored for an owner, in store order
    async fn get_all(&self, owner_id: &str) -> Result<Vec<serde_json::Value>>;
}
