//! Effects produced by state transitions

use super::ConvState;
use crate::llm::Message;
use serde::Serialize;

/// Notification that the session changed, for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub state: ConvState,
    /// What happened, e.g. `crisis_reply` or `cleared`
    pub reason: &'static str,
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the conversation log
    AppendMessage(Message),

    /// Call the completion client with the current history
    RequestCompletion,

    /// Replace the history with the system message plus `notice`
    ResetHistory { notice: String },

    /// Remember (or forget, when `None`) the session's API key
    StoreCredential { api_key: Option<String> },

    /// Notify connected clients
    NotifyClient(StateChange),
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendMessage(Message::user(text))
    }

    pub fn append_assistant(text: impl Into<String>) -> Self {
        Effect::AppendMessage(Message::assistant(text))
    }

    pub fn notify(state: ConvState, reason: &'static str) -> Self {
        Effect::NotifyClient(StateChange { state, reason })
    }
}
