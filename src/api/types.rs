//! API request and response types

use crate::llm::Message;
use crate::state_machine::ConvState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to submit a user turn
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to set the session's API key
#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub api_key: String,
}

/// Response for a newly created session
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

/// Response with a session's current state and transcript
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub state: ConvState,
    pub messages: Vec<Message>,
}

/// Response for queued actions
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// Display settings for the page
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub title: String,
    pub caption: &'static str,
    pub warning_message: String,
    pub crisis_hotline: String,
    pub crisis_text: String,
    pub background_color: String,
    pub model: String,
}

/// Steps of the grounding exercise
#[derive(Debug, Serialize)]
pub struct GroundingResponse {
    pub steps: Vec<&'static str>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
