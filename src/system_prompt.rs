//! Seed messages for new and cleared conversations

use crate::config::AppText;

/// System instruction placed first in every conversation
pub const SYSTEM_PROMPT: &str = "You are an empathetic mental health consultation assistant for educational purposes. \
You must not provide clinical diagnoses. If the user indicates immediate danger or self-harm, \
provide crisis resources and encourage contacting emergency services.";

/// Caption shown under the page title
pub const CAPTION: &str =
    "This app provides informational support only. Not a replacement for licensed mental health care.";

/// First assistant message of a new conversation
pub fn greeting(app: &AppText) -> String {
    format!(
        "Hello — I'm here to provide information and support. {} How can I help?",
        app.warning_message
    )
}

/// Assistant message that replaces the history on clear
pub fn clear_notice(app: &AppText) -> String {
    format!("Conversation cleared. {}", app.warning_message)
}

/// The 5-4-3-2-1 grounding exercise
pub fn grounding_exercise() -> Vec<&'static str> {
    vec![
        "Name 5 things you can see right now.",
        "Name 4 things you can touch.",
        "Name 3 things you can hear.",
        "Name 2 things you can smell (or would like to).",
        "Name 1 thing about yourself that you like.",
    ]
}
