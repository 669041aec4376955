//! Property-based tests for the tutor's save-confirmation helpers
//!
//! Invariants:
//! - Offer stripping only touches replies that report a duplicate
//! - Extraction never invents text: output is always part of the input
//! - Confirmation needs a trailing user turn of bounded length

use proptest::prelude::*;

use wordpan_api::services::tutor::confirmation::{
    detect_save_confirmation, extract_save_tool_message, strip_offer_when_already_in_deck,
};
use wordpan_api::services::tutor::{ConversationMessage, Role};

const OFFER: &str = "Would you like me to save this word to your flashcard deck?";

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z '!?.,]{0,80}"
}

proptest! {
    #[test]
    fn strip_is_identity_without_duplicate_notice(text in arb_text()) {
        prop_assume!(!text.contains("already in your deck"));
        prop_assert_eq!(strip_offer_when_already_in_deck(&text), text);
    }

    #[test]
    fn strip_removes_offer_from_duplicate_notice(prefix in "[a-zA-Z ]{0,30}") {
        let content = format!("{prefix} {OFFER} This word pair ('a' → 'b') is already in your deck.");
        let stripped = strip_offer_when_already_in_deck(&content);
        prop_assert!(!stripped.contains(OFFER));
        prop_assert!(stripped.ends_with("is already in your deck."));
    }

    #[test]
    fn extract_returns_part_of_input(prefix in arb_text(), suffix in arb_text(), saved in any::<bool>()) {
        let tool_message = if saved {
            "Done! I've added 'a' → 'b' to your flashcard deck. You'll see it in your next practice session."
        } else {
            "This word pair ('a' → 'b') is already in your deck. No duplicate was created."
        };
        let content = format!("{prefix}{tool_message}{suffix}");
        let extracted = extract_save_tool_message(&content);
        prop_assert!(content.contains(extracted.as_str()));
        prop_assert!(extracted.contains("'a' → 'b'"));
    }

    #[test]
    fn long_replies_never_confirm(reply in "yes [a-z]{60,120}") {
        let messages = vec![
            ConversationMessage::new(Role::Assistant, OFFER),
            ConversationMessage::new(Role::User, reply),
        ];
        prop_assert_eq!(detect_save_confirmation(&messages), None);
    }

    #[test]
    fn assistant_last_never_confirms(text in arb_text()) {
        let messages = vec![
            ConversationMessage::new(Role::User, "yes"),
            ConversationMessage::new(Role::Assistant, format!("{OFFER} {text}")),
        ];
        prop_assert_eq!(detect_save_confirmation(&messages), None);
    }
}
