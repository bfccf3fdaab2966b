//! Conversation state types

use crate::config::AppText;
use serde::{Deserialize, Serialize};

/// Conversation state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Waiting for user input
    #[default]
    Idle,

    /// Completion request in flight
    ModelInvoked,
}

impl ConvState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConvState::Idle => "idle",
            ConvState::ModelInvoked => "model_invoked",
        }
    }
}

/// Immutable per-session context available to transitions
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub session_id: String,
    pub app: AppText,
}

impl ConvContext {
    pub fn new(session_id: impl Into<String>, app: AppText) -> Self {
        Self {
            session_id: session_id.into(),
            app,
        }
    }
}
