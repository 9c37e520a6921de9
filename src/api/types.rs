use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One user known to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
}

/// One chat session owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub model: String,
    pub permission_mode: String,
}

/// One conversation message. Immutable once received; `payload` is a
/// free-form structure whose shape depends on `message_type`, and
/// `raw_text`, when present, is the authoritative display string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<String>,
    pub role: String,
    pub message_type: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl Message {
    /// Synthetic system message for surfacing errors inside the
    /// conversation instead of throwing them away.
    pub fn system(message_type: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: None,
            role: "system".to_string(),
            message_type: message_type.to_string(),
            created_at: Some(chrono::Local::now().to_rfc3339()),
            payload: serde_json::json!({ "content": text }),
            raw_text: Some(text),
        }
    }
}

/// Display-only session event, fetched with snapshots and never updated
/// incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub event_type: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub details: Value,
}

/// Error payload carried by an `error` stream envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamFailure {
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One decoded unit from the streaming channel. Transient: consumed
/// immediately, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "lowercase")]
pub enum Envelope {
    Message(Message),
    Error(StreamFailure),
}

/// Body for `POST /api/sessions`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionCreate<'a> {
    pub user_id: &'a str,
    pub title: &'a str,
}

/// Body for `POST /api/sessions/{id}/messages/stream`.
#[derive(Debug, Clone, Serialize)]
pub struct PromptRequest<'a> {
    pub prompt: &'a str,
}
