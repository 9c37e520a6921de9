//! REST and streaming transport for the session backend.

mod client;
mod types;

pub use client::ApiClient;
pub use types::{
    Envelope, LogEntry, Message, PromptRequest, Session, SessionCreate, StreamFailure, User,
};
