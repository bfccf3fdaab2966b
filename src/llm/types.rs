//! Common types for completion requests

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged entry in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Text extracted from a completion response.
///
/// Extraction order is fixed: the first choice's `message.content`, then the
/// first choice's legacy `text` field, then the raw response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyText {
    Message(String),
    Text(String),
    Raw(String),
}

impl ReplyText {
    pub fn into_string(self) -> String {
        match self {
            ReplyText::Message(s) | ReplyText::Text(s) | ReplyText::Raw(s) => s,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReplyText::Message(s) | ReplyText::Text(s) | ReplyText::Raw(s) => s,
        }
    }

    /// Short label for logging which extraction rule applied
    pub fn source(&self) -> &'static str {
        match self {
            ReplyText::Message(_) => "message",
            ReplyText::Text(_) => "text",
            ReplyText::Raw(_) => "raw",
        }
    }
}

impl fmt::Display for ReplyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion response
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub reply: ReplyText,
    pub usage: Usage,
}

impl LlmResponse {
    /// Build a response whose reply came from `message.content`
    #[cfg(test)]
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            reply: ReplyText::Message(text.into()),
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
