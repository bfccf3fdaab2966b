//! Property tests for crisis detection

use super::*;
use proptest::prelude::*;

fn arb_keyword() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(CRISIS_KEYWORDS)
}

/// Randomly upper-case individual characters
fn arb_casing(phrase: &'static str) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), phrase.len()).prop_map(move |flips| {
        phrase
            .chars()
            .zip(flips)
            .map(|(c, upper)| if upper { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_keyword_in_any_case_is_detected(
        (prefix, cased, suffix) in (
            "[a-zA-Z0-9 ,.!?]{0,40}",
            arb_keyword().prop_flat_map(arb_casing),
            "[a-zA-Z0-9 ,.!?]{0,40}",
        )
    ) {
        let text = format!("{prefix}{cased}{suffix}");
        prop_assert!(contains_crisis_keywords(Some(&text)));
    }

    #[test]
    fn prop_text_without_keywords_is_not_detected(text in "[a-zA-Z0-9 ,.!?]{0,80}") {
        let lowered = text.to_lowercase();
        prop_assume!(!CRISIS_KEYWORDS.iter().any(|k| lowered.contains(k)));
        prop_assert!(!contains_crisis_keywords(Some(&text)));
    }

    #[test]
    fn prop_detection_ignores_case(text in "[a-zA-Z ]{0,80}") {
        prop_assert_eq!(
            contains_crisis_keywords(Some(&text.to_uppercase())),
            contains_crisis_keywords(Some(&text.to_lowercase()))
        );
    }
}
