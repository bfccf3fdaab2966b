//! Pure state transition function

use super::{ConvContext, ConvState, Effect, Event};
use crate::safety::{contains_crisis_keywords, crisis_response};
use crate::system_prompt::clear_notice;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A reply is still being prepared, please wait")]
    SessionBusy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function: same inputs, same outputs, no I/O.
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Crisis phrases short-circuit the model entirely
        (ConvState::Idle, Event::UserMessage { text }) if contains_crisis_keywords(Some(&text)) => {
            Ok(TransitionResult::new(ConvState::Idle)
                .with_effect(Effect::append_user(text))
                .with_effect(Effect::append_assistant(crisis_response(&context.app)))
                .with_effect(Effect::notify(ConvState::Idle, "crisis_reply")))
        }

        (ConvState::Idle, Event::UserMessage { text }) => {
            Ok(TransitionResult::new(ConvState::ModelInvoked)
                .with_effect(Effect::append_user(text))
                .with_effect(Effect::notify(ConvState::ModelInvoked, "model_invoked"))
                .with_effect(Effect::RequestCompletion))
        }

        (ConvState::ModelInvoked, Event::UserMessage { .. }) => Err(TransitionError::SessionBusy),

        (ConvState::ModelInvoked, Event::ModelReply { text }) => {
            Ok(TransitionResult::new(ConvState::Idle)
                .with_effect(Effect::append_assistant(text))
                .with_effect(Effect::notify(ConvState::Idle, "assistant_replied")))
        }

        (ConvState::Idle, Event::ModelReply { .. }) => Err(TransitionError::InvalidTransition(
            "model reply received while idle".to_string(),
        )),

        (_, Event::Clear) => Ok(TransitionResult::new(ConvState::Idle)
            .with_effect(Effect::ResetHistory {
                notice: clear_notice(&context.app),
            })
            .with_effect(Effect::notify(ConvState::Idle, "cleared"))),

        (state, Event::SetCredential { api_key }) => {
            let trimmed = api_key.trim();
            let (api_key, reason) = if trimmed.is_empty() {
                (None, "credential_cleared")
            } else {
                (Some(trimmed.to_string()), "credential_set")
            };
            Ok(TransitionResult::new(*state)
                .with_effect(Effect::StoreCredential { api_key })
                .with_effect(Effect::notify(*state, reason)))
        }
    }
}
