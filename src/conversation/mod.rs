//! Authoritative in-memory model of the active session's history.

use crate::api::{LogEntry, Message};
use serde_json::Value;

/// Messages and logs for the current session, reconciled between full
/// snapshot loads and incremental stream events.
///
/// Both mutators carry the delivering operation's target session so that a
/// stale stream draining after a session switch cannot touch the new
/// session's history.
#[derive(Debug, Default)]
pub struct ConversationState {
    session_id: Option<String>,
    messages: Vec<Message>,
    logs: Vec<LogEntry>,
}

impl ConversationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Replace the entire visible history in one step. Ordering is
    /// oldest-to-newest exactly as the server returned it; no independent
    /// sort happens here or anywhere downstream.
    pub fn load_snapshot(
        &mut self,
        session_id: &str,
        messages: Vec<Message>,
        logs: Vec<LogEntry>,
    ) {
        self.session_id = Some(session_id.to_string());
        self.messages = messages;
        self.logs = logs;
    }

    /// Append one streamed message. Returns `false` (and discards) when the
    /// delivering stream targets a session other than the current one.
    pub fn apply_message(&mut self, session_id: &str, message: Message) -> bool {
        if self.session_id.as_deref() != Some(session_id) {
            tracing::debug!(session_id, "discarding stale stream message");
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Drop all history, e.g. when the user has no sessions left.
    pub fn clear(&mut self) {
        self.session_id = None;
        self.messages.clear();
        self.logs.clear();
    }
}

/// Whether a message should render flagged as a failed result. Styling
/// hook only; no behavioral change.
#[must_use]
pub fn is_failed_result(message: &Message) -> bool {
    message.role == "result"
        && message
            .payload
            .get("is_error")
            .and_then(Value::as_bool)
            .unwrap_or(false)
}

/// Extract the display text of a message.
///
/// The precedence is a firm contract — messages frequently carry several
/// eligible fields at once:
/// 1. `raw_text` (authoritative pre-rendered string)
/// 2. string `payload.result`
/// 3. string `payload.content`
/// 4. array `payload.content`: each block's `text` or `thinking`,
///    newline-joined, when any survive
/// 5. `payload.prompt`
/// 6. pretty-printed payload dump.
#[must_use]
pub fn display_text(message: &Message) -> String {
    if let Some(raw) = message.raw_text.as_deref()
        && !raw.is_empty()
    {
        return raw.to_string();
    }

    let payload = &message.payload;

    if let Some(result) = payload.get("result").and_then(Value::as_str) {
        return result.to_string();
    }

    match payload.get("content") {
        Some(Value::String(content)) => return content.clone(),
        Some(Value::Array(blocks)) => {
            let texts: Vec<&str> = blocks
                .iter()
                .filter_map(|block| {
                    block
                        .get("text")
                        .or_else(|| block.get("thinking"))
                        .and_then(Value::as_str)
                })
                .filter(|text| !text.is_empty())
                .collect();
            if !texts.is_empty() {
                return texts.join("\n");
            }
        }
        _ => {}
    }

    if let Some(prompt) = payload.get("prompt").and_then(Value::as_str) {
        return prompt.to_string();
    }

    serde_json::to_string_pretty(payload).unwrap_or_default()
}
