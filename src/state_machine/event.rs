//! Events that can occur in a conversation

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// User submitted a turn
    UserMessage { text: String },

    /// Completion client produced a reply (possibly a fallback string)
    ModelReply { text: String },

    /// User asked to clear the conversation
    Clear,

    /// User supplied an API key for this session. Blank clears it.
    SetCredential { api_key: String },
}
