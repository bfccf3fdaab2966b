//! Property tests for history trimming

use super::*;
use crate::llm::Role;
use proptest::prelude::*;

fn arb_turn() -> impl Strategy<Value = Message> {
    (prop_oneof![Just(Role::User), Just(Role::Assistant)], "[a-z ]{0,12}")
        .prop_map(|(role, content)| Message::new(role, content))
}

/// Optional leading system message followed by user/assistant turns
fn arb_history() -> impl Strategy<Value = Vec<Message>> {
    (any::<bool>(), proptest::collection::vec(arb_turn(), 0..20)).prop_map(|(with_system, turns)| {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        if with_system {
            messages.push(Message::system("instructions"));
        }
        messages.extend(turns);
        messages
    })
}

proptest! {
    #[test]
    fn prop_system_first_and_bounded(messages in arb_history(), keep in 0usize..10) {
        let trimmed = trim_messages(&messages, keep);
        let has_system = messages.iter().any(Message::is_system);

        if has_system {
            prop_assert!(trimmed[0].is_system());
        }
        let others = trimmed.iter().filter(|m| !m.is_system()).count();
        prop_assert!(others <= keep);
    }

    #[test]
    fn prop_keeps_suffix_in_order(messages in arb_history(), keep in 0usize..10) {
        let trimmed = trim_messages(&messages, keep);
        let others: Vec<_> = messages.iter().filter(|m| !m.is_system()).cloned().collect();
        let kept: Vec<_> = trimmed.iter().filter(|m| !m.is_system()).cloned().collect();

        let start = others.len().saturating_sub(keep);
        prop_assert_eq!(kept, others[start..].to_vec());
    }

    #[test]
    fn prop_idempotent(messages in arb_history(), keep in 0usize..10) {
        let once = trim_messages(&messages, keep);
        prop_assert_eq!(trim_messages(&once, keep), once.clone());

        let others = messages.iter().filter(|m| !m.is_system()).count();
        if others <= keep {
            prop_assert_eq!(once, messages);
        }
    }
}
