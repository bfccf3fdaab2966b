//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::config::AppText;
use crate::safety::CRISIS_KEYWORDS;
use proptest::prelude::*;

fn test_context() -> ConvContext {
    ConvContext::new("test-session", AppText::default())
}

fn arb_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![Just(ConvState::Idle), Just(ConvState::ModelInvoked)]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ,.!?]{0,60}",
        (
            "[a-z ]{0,20}",
            proptest::sample::select(CRISIS_KEYWORDS),
            "[a-z ]{0,20}"
        )
            .prop_map(|(a, k, b)| format!("{a}{k}{b}")),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::UserMessage { text }),
        "[a-zA-Z .]{0,40}".prop_map(|text| Event::ModelReply { text }),
        Just(Event::Clear),
        "[a-z0-9 -]{0,20}".prop_map(|api_key| Event::SetCredential { api_key }),
    ]
}

proptest! {
    #[test]
    fn prop_completion_only_requested_from_idle(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &test_context(), event) {
            if result.effects.contains(&Effect::RequestCompletion) {
                prop_assert_eq!(state, ConvState::Idle);
                prop_assert_eq!(result.new_state, ConvState::ModelInvoked);
            }
        }
    }

    #[test]
    fn prop_crisis_text_never_reaches_model(text in arb_text()) {
        let is_crisis = crate::safety::contains_crisis_keywords(Some(&text));
        let result = transition(&ConvState::Idle, &test_context(), Event::UserMessage { text }).unwrap();
        prop_assert_eq!(result.effects.contains(&Effect::RequestCompletion), !is_crisis);
    }

    #[test]
    fn prop_every_success_notifies_with_new_state(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &test_context(), event) {
            let notified: Vec<_> = result
                .effects
                .iter()
                .filter_map(|e| match e {
                    Effect::NotifyClient(change) => Some(change.state),
                    _ => None,
                })
                .collect();
            prop_assert_eq!(notified, vec![result.new_state]);
        }
    }

    #[test]
    fn prop_clear_always_idle(state in arb_state()) {
        let result = transition(&state, &test_context(), Event::Clear).unwrap();
        prop_assert_eq!(result.new_state, ConvState::Idle);
    }

    #[test]
    fn prop_user_message_appended_first(text in arb_text()) {
        let result = transition(
            &ConvState::Idle,
            &test_context(),
            Event::UserMessage { text: text.clone() },
        )
        .unwrap();
        prop_assert_eq!(result.effects.first(), Some(&Effect::append_user(text)));
    }
}
