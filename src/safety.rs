//! Crisis phrase detection
//!
//! A fixed list of high-risk phrases. When any of them appears in user text
//! the model is not consulted and a static crisis-resources reply is used
//! instead.

use crate::config::AppText;

#[cfg(test)]
mod proptests;

/// Lowercase phrases that trigger the crisis reply
pub const CRISIS_KEYWORDS: &[&str] = &[
    "kill myself",
    "suicide",
    "end it all",
    "want to die",
    "harm myself",
    "self harm",
    "hurt myself",
    "not want to live",
    "suicidal",
];

/// Case-insensitive substring match against [`CRISIS_KEYWORDS`].
///
/// Absent input is never a crisis.
pub fn contains_crisis_keywords(text: Option<&str>) -> bool {
    let Some(text) = text else {
        return false;
    };
    let lowered = text.to_lowercase();
    CRISIS_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Static reply pointing the user at crisis resources
pub fn crisis_response(app: &AppText) -> String {
    format!(
        "I am really sorry you are feeling this way. Please contact immediate support:\n\
         - Crisis Hotline: {}\n\
         - Crisis Text: {}\n\
         - Emergency services if you are in immediate danger.\n",
        app.crisis_hotline, app.crisis_text
    )
}
