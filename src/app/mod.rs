//! Owned application state and command dispatch.
//!
//! All mutable state lives in one [`App`] aggregate with an explicit
//! lifecycle: built at startup, reset on session or user switch. Rendering
//! goes through the [`ConversationView`] seam so the whole flow can run
//! headless in tests.

mod repl;

pub use repl::{ReplCommand, run};

use crate::api::{ApiClient, Envelope, LogEntry, Message, Session, User};
use crate::ask::{AskQueueEntry, AskSequencer, extract_ask_requests};
use crate::config::{Config, Theme};
use crate::conversation::ConversationState;
use crate::error::{BootstrapError, ParleyError, Result};
use crate::stream::FrameDecoder;
use crate::timer::ResponseTimer;
use futures_util::StreamExt;

/// Message type that terminates a streamed response.
const RESULT_MESSAGE_TYPE: &str = "ResultMessage";

/// Rendering seam. Implementations project state to the terminal; the
/// [`NullView`] keeps tests silent.
pub trait ConversationView {
    fn show_message(&mut self, message: &Message);
    fn show_snapshot(&mut self, messages: &[Message], logs: &[LogEntry]);
    fn show_sessions(&mut self, sessions: &[Session], current: Option<&str>);
    fn status(&mut self, line: &str);
    fn timer_started(&mut self);
    fn timer_stopped(&mut self, label: &str);
}

/// View that renders nothing.
#[derive(Debug, Default)]
pub struct NullView;

impl ConversationView for NullView {
    fn show_message(&mut self, _message: &Message) {}
    fn show_snapshot(&mut self, _messages: &[Message], _logs: &[LogEntry]) {}
    fn show_sessions(&mut self, _sessions: &[Session], _current: Option<&str>) {}
    fn status(&mut self, _line: &str) {}
    fn timer_started(&mut self) {}
    fn timer_stopped(&mut self, _label: &str) {}
}

/// What the user did with one ask presentation.
#[derive(Debug, Clone)]
pub enum AskOutcome {
    /// A sub-form composed successfully; submit this answer as a prompt.
    Submit { answer: String },
    /// The presentation was dismissed without an answer.
    Dismissed,
}

/// Presentation seam for queued ask entries.
pub trait AskPresenter {
    fn present(&mut self, entry: &AskQueueEntry) -> AskOutcome;
}

/// Presenter that always dismisses; used where no interaction is possible.
#[derive(Debug, Default)]
pub struct DismissingPresenter;

impl AskPresenter for DismissingPresenter {
    fn present(&mut self, _entry: &AskQueueEntry) -> AskOutcome {
        AskOutcome::Dismissed
    }
}

pub struct App {
    api: ApiClient,
    config: Config,
    view: Box<dyn ConversationView>,
    presenter: Box<dyn AskPresenter>,
    users: Vec<User>,
    sessions: Vec<Session>,
    current_user_id: Option<String>,
    current_session_id: Option<String>,
    is_streaming: bool,
    conversation: ConversationState,
    sequencer: AskSequencer,
    timer: ResponseTimer,
}

impl App {
    pub fn new(
        api: ApiClient,
        config: Config,
        view: Box<dyn ConversationView>,
        presenter: Box<dyn AskPresenter>,
    ) -> Self {
        Self {
            api,
            config,
            view,
            presenter,
            users: Vec::new(),
            sessions: Vec::new(),
            current_user_id: None,
            current_session_id: None,
            is_streaming: false,
            conversation: ConversationState::new(),
            sequencer: AskSequencer::new(),
            timer: ResponseTimer::new(),
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session_id.as_deref()
    }

    pub fn current_user_id(&self) -> Option<&str> {
        self.current_user_id.as_deref()
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn sequencer(&self) -> &AskSequencer {
        &self.sequencer
    }

    pub fn theme(&self) -> Theme {
        self.config.theme
    }

    /// Load users, pick the first, load its sessions and make sure one
    /// exists. An empty user list is fatal to startup.
    pub async fn bootstrap(&mut self) -> Result<()> {
        self.users = self.api.list_users().await?;
        let Some(first) = self.users.first() else {
            return Err(BootstrapError::NoUsers.into());
        };
        self.current_user_id = Some(first.id.clone());
        self.load_sessions().await?;
        if self.current_session_id.is_none() {
            self.create_session().await?;
        }
        Ok(())
    }

    /// Render a fatal startup failure as the sole conversation content.
    pub fn surface_bootstrap_failure(&mut self, error: &ParleyError) {
        let message = Message::system("bootstrap-error", error.to_string());
        self.view.show_snapshot(std::slice::from_ref(&message), &[]);
    }

    /// Reload the session list for the current user, keeping the current
    /// selection when it still exists and falling back to the first session
    /// otherwise.
    pub async fn load_sessions(&mut self) -> Result<()> {
        let Some(user_id) = self.current_user_id.clone() else {
            return Ok(());
        };
        self.sessions = self.api.list_sessions(&user_id).await?;

        let still_present = self
            .current_session_id
            .as_deref()
            .is_some_and(|current| self.sessions.iter().any(|session| session.id == current));
        if !still_present {
            self.current_session_id = self.sessions.first().map(|session| session.id.clone());
        }
        self.view
            .show_sessions(&self.sessions, self.current_session_id.as_deref());

        if let Some(session_id) = self.current_session_id.clone() {
            self.refresh_conversation(&session_id).await?;
        } else {
            self.conversation.clear();
            self.view.show_snapshot(&[], &[]);
        }
        Ok(())
    }

    /// Switch to another session. Queued ask requests are scoped to one
    /// conversation, so the sequencer resets first.
    pub async fn select_session(&mut self, session_id: &str) -> Result<()> {
        self.sequencer.reset();
        self.current_session_id = Some(session_id.to_string());
        self.view
            .show_sessions(&self.sessions, self.current_session_id.as_deref());
        self.refresh_conversation(session_id).await
    }

    pub async fn switch_user(&mut self, user_id: &str) -> Result<()> {
        self.sequencer.reset();
        self.current_user_id = Some(user_id.to_string());
        self.current_session_id = None;
        self.load_sessions().await
    }

    pub async fn create_session(&mut self) -> Result<()> {
        let Some(user_id) = self.current_user_id.clone() else {
            return Ok(());
        };
        let session = self.api.create_session(&user_id, "New Session").await?;
        self.sequencer.reset();
        self.current_session_id = Some(session.id);
        self.load_sessions().await
    }

    /// Full snapshot reload: messages and logs fetched together and applied
    /// in one step. A switch that happened while the fetch was in flight
    /// makes the result stale; it is discarded.
    pub async fn refresh_conversation(&mut self, session_id: &str) -> Result<()> {
        let messages = self.api.messages(session_id).await?;
        let logs = self.api.logs(session_id).await?;
        if self.current_session_id.as_deref() != Some(session_id) {
            tracing::debug!(session_id, "discarding stale snapshot");
            return Ok(());
        }
        // Snapshot renders never enqueue ask requests; only the live
        // streaming path does. The seen-set guards the overlap between the
        // two observations of the same message.
        self.conversation.load_snapshot(session_id, messages, logs);
        self.view
            .show_snapshot(self.conversation.messages(), self.conversation.logs());
        Ok(())
    }

    /// Submit a prompt and drive the streaming response to completion.
    ///
    /// The streaming flag and timer are released in a guaranteed cleanup
    /// path: a failed stream never leaves input permanently disabled.
    /// Failures are surfaced as synthetic system messages; the returned
    /// error only tells the caller that submission did not go through.
    pub async fn submit_prompt(&mut self, prompt: &str) -> Result<()> {
        let Some(session_id) = self.current_session_id.clone() else {
            return Ok(());
        };
        if self.is_streaming {
            return Ok(());
        }
        self.is_streaming = true;
        self.timer.start();
        self.view.timer_started();

        let outcome = match self.run_stream(&session_id, prompt).await {
            Ok(()) => self.refresh_conversation(&session_id).await,
            Err(error) => Err(error),
        };
        if let Err(error) = &outcome {
            self.surface_failure("error", &error.to_string(), &session_id);
        }

        self.timer.stop();
        self.view.timer_stopped(&self.timer.label());
        self.is_streaming = false;
        outcome
    }

    /// Present queued ask entries one at a time until the queue is idle.
    /// A submitted answer re-enters the ordinary prompt path; once sent it
    /// is indistinguishable from free-form input.
    pub async fn drain_asks(&mut self) {
        while let Some(entry) = self.sequencer.current().cloned() {
            match self.presenter.present(&entry) {
                AskOutcome::Submit { answer } => {
                    if self.submit_prompt(&answer).await.is_ok() {
                        self.sequencer.close();
                    }
                    // On failure the entry stays open; the next loop turn
                    // re-presents it so the user can retry or dismiss.
                }
                AskOutcome::Dismissed => self.sequencer.close(),
            }
        }
    }

    /// Out-of-band interrupt. The in-flight stream keeps draining and is
    /// treated as advisory; state re-synchronizes from a snapshot reload.
    pub async fn interrupt(&mut self) -> Result<()> {
        let Some(session_id) = self.current_session_id.clone() else {
            return Ok(());
        };
        match self.api.interrupt(&session_id).await {
            Ok(()) => self.refresh_conversation(&session_id).await,
            Err(error) => {
                self.surface_failure("interrupt-error", &error.to_string(), &session_id);
                Ok(())
            }
        }
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        Ok(self.config.toggle_theme()?)
    }

    async fn run_stream(&mut self, session_id: &str, prompt: &str) -> Result<()> {
        let response = self.api.stream_prompt(session_id, prompt).await?;
        let mut body = response.bytes_stream();
        let mut decoder = FrameDecoder::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(crate::error::TransportError::Network)?;
            for envelope in decoder.feed(&chunk)? {
                self.handle_envelope(session_id, envelope);
            }
        }
        if !decoder.residual().trim().is_empty() {
            tracing::debug!("dropping partial record at stream end");
        }
        Ok(())
    }

    fn handle_envelope(&mut self, session_id: &str, envelope: Envelope) {
        match envelope {
            Envelope::Message(message) => {
                let terminal = message.message_type == RESULT_MESSAGE_TYPE;
                let requests = extract_ask_requests(&message);
                if self.conversation.apply_message(session_id, message.clone()) {
                    self.view.show_message(&message);
                    if !requests.is_empty() {
                        self.sequencer.enqueue(&message, requests);
                    }
                }
                if terminal {
                    self.timer.stop();
                    self.view.timer_stopped(&self.timer.label());
                }
            }
            Envelope::Error(failure) => {
                self.surface_failure("error", &failure.message, session_id);
                self.timer.stop();
                self.view.timer_stopped(&self.timer.label());
            }
        }
    }

    /// Insert a synthetic system message instead of throwing silently. A
    /// stale target session falls back to a status line so the failure is
    /// still reported once.
    fn surface_failure(&mut self, message_type: &str, text: &str, session_id: &str) {
        let message = Message::system(message_type, text);
        if self.conversation.apply_message(session_id, message.clone()) {
            self.view.show_message(&message);
        } else {
            self.view.status(text);
        }
    }
}
