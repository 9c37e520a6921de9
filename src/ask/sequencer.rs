use super::extract::AskRequest;
use crate::api::Message;
use std::collections::{HashSet, VecDeque};

/// One queued presentation: every request extracted from a single message.
#[derive(Debug, Clone)]
pub struct AskQueueEntry {
    pub key: String,
    pub requests: Vec<AskRequest>,
}

/// Stable identity of a message for deduplication: its id, or a composite
/// of creation time, role and type when the server assigned none.
#[must_use]
pub fn message_key(message: &Message) -> String {
    if let Some(id) = message.id.as_deref()
        && !id.is_empty()
    {
        return id.to_string();
    }
    format!(
        "{}|{}|{}",
        message.created_at.as_deref().unwrap_or_default(),
        message.role,
        message.message_type
    )
}

/// Single-flight queue of pending question presentations.
///
/// The state machine has two states: idle (no entry open) and presenting
/// (exactly one entry open). Entries drain strictly FIFO; at most one
/// presentation is visible at any time by construction, not by locking.
/// A seen-set keyed on [`message_key`] makes `enqueue` idempotent, which
/// protects against observing the same message twice — once live on the
/// stream and again on the follow-up snapshot reload.
#[derive(Debug, Default)]
pub struct AskSequencer {
    queue: VecDeque<AskQueueEntry>,
    open: Option<AskQueueEntry>,
    seen: HashSet<String>,
}

impl AskSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the requests extracted from `message`. Returns `true` when a
    /// new entry was actually queued; repeats of a seen key and empty
    /// request lists are no-ops.
    pub fn enqueue(&mut self, message: &Message, requests: Vec<AskRequest>) -> bool {
        if requests.is_empty() {
            return false;
        }
        let key = message_key(message);
        if !self.seen.insert(key.clone()) {
            tracing::debug!(%key, "ask request already shown; skipping");
            return false;
        }
        self.queue.push_back(AskQueueEntry { key, requests });
        self.try_advance();
        true
    }

    /// The entry currently being presented, if any.
    pub fn current(&self) -> Option<&AskQueueEntry> {
        self.open.as_ref()
    }

    pub fn is_presenting(&self) -> bool {
        self.open.is_some()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Tear down the open presentation and immediately open the next queued
    /// entry, so the queue drains without external polling.
    pub fn close(&mut self) {
        self.open = None;
        self.try_advance();
    }

    /// Drop the queue and any open presentation. Called on session or user
    /// switch: queued requests are scoped to one conversation and must not
    /// leak across. The seen-set is deliberately kept; a re-used message
    /// key stays suppressed for the process lifetime.
    pub fn reset(&mut self) {
        self.queue.clear();
        if self.open.is_some() {
            self.close();
        }
    }

    fn try_advance(&mut self) {
        if self.open.is_none() {
            self.open = self.queue.pop_front();
        }
    }
}
