//! Conversation log and history trimming

use crate::llm::Message;

#[cfg(test)]
mod proptests;

/// Non-system messages sent to the completion service by default
pub const DEFAULT_KEEP: usize = 6;

/// Bounded view of `messages` for submission to the completion service.
///
/// Every system message is kept, first, followed by the last `keep`
/// non-system messages in their original order. The input is not modified.
pub fn trim_messages(messages: &[Message], keep: usize) -> Vec<Message> {
    let (system, others): (Vec<&Message>, Vec<&Message>) =
        messages.iter().partition(|m| m.is_system());
    let skip = others.len().saturating_sub(keep);

    system
        .into_iter()
        .chain(others.into_iter().skip(skip))
        .cloned()
        .collect()
}

/// Ordered, append-only message log for one session.
///
/// Starts with a system instruction and a greeting. The only non-append
/// mutation is [`ConversationLog::clear`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn seeded(system_prompt: impl Into<String>, greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::assistant(greeting)],
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drop everything but the system message and append `notice`
    pub fn clear(&mut self, notice: impl Into<String>) {
        self.messages.retain(Message::is_system);
        self.messages.truncate(1);
        self.messages.push(Message::assistant(notice));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages shown to the user (everything except system messages)
    pub fn transcript(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| !m.is_system())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}
