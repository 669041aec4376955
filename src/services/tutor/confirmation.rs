//! Save-confirmation handling: spotting "yes, save it" replies and trimming
//! specialist replies around the deck tool messages.

use super::schemas::{ConversationMessage, Intent, Role};

const CONFIRMATION_PHRASES: [&str; 17] = [
    "yes",
    "yeah",
    "yep",
    "sure",
    "ok",
    "okay",
    "please",
    "please do",
    "save it",
    "yes, save it",
    "yes save it",
    "add it",
    "add it please",
    "go ahead",
    "do it",
    "yes please",
    "sure thing",
];

const CONFIRMATION_KEYWORDS: [&str; 5] = ["yes", "save", "add", "sure", "please"];

const MAX_CONFIRMATION_LEN: usize = 60;
const MAX_KEYWORD_CONFIRMATION_LEN: usize = 25;

const SAVE_OFFERS: [&str; 3] = [
    "Would you like me to save this word to your flashcard deck?",
    "Would you like me to add this to your flashcard deck?",
    "Would you like me to add this word to your flashcard deck?",
];

const ALREADY_IN_DECK: &str = "already in your deck";
const SAVED_START: &str = "Done! I've added";
const SAVED_END: &str = "You'll see it in your next practice session.";
const DUPLICATE_START: &str = "This word pair";
const DUPLICATE_END: &str = "No duplicate was created.";

pub const SAVE_CONFIRMATION_INSTRUCTION: &str = "The user confirmed they want to save the word. \
You MUST call the save_word_pair tool with the source word and translation from the conversation \
(e.g. hello and hola). Your response must be EXACTLY the tool's return message and nothing else: \
if the tool says 'Done! I've added...' then output only that; if the tool says 'This word pair ... \
is already in your deck' then output only that. Do NOT repeat the translation, pronunciation, or any \
other explanation.";

const SAVE_CONFIRMATION_MARKER: &str = "MUST call the save_word_pair";

pub fn is_save_confirmation_instruction(instruction: &str) -> bool {
    instruction.contains(SAVE_CONFIRMATION_MARKER)
}

/// Returns the intent to force when the user just confirmed an offer to save
/// a word to the flashcard deck.
pub fn detect_save_confirmation(messages: &[ConversationMessage]) -> Option<Intent> {
    if messages.len() < 2 {
        return None;
    }
    let last = messages.last()?;
    if last.role != Role::User {
        return None;
    }

    let reply = last.content.trim().to_lowercase();
    let reply = reply.trim_end_matches(['.', ',', '!', '?']);
    if reply.is_empty() || reply.chars().count() > MAX_CONFIRMATION_LEN {
        return None;
    }

    let is_phrase = CONFIRMATION_PHRASES.contains(&reply);
    let is_short_keyword = reply.chars().count() <= MAX_KEYWORD_CONFIRMATION_LEN
        && CONFIRMATION_KEYWORDS.iter().any(|k| reply.contains(k));
    if !is_phrase && !is_short_keyword {
        return None;
    }

    let offer = messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content.trim().to_lowercase())
        .filter(|c| !c.is_empty())?;

    if !offer.contains("flashcard") {
        return None;
    }
    if !offer.contains("save") && !offer.contains("add") {
        return None;
    }

    if offer.contains("new word") || offer.contains("vocabulary") {
        Some(Intent::NewVocabulary)
    } else {
        Some(Intent::Translation)
    }
}

/// Drops the save offer from a reply that also says the pair is already in
/// the deck.
pub fn strip_offer_when_already_in_deck(content: &str) -> String {
    if content.is_empty() || !content.contains(ALREADY_IN_DECK) {
        return content.to_string();
    }

    let mut content = content.to_string();
    for offer in SAVE_OFFERS {
        if content.contains(offer) {
            content = content.replace(offer, "").trim().to_string();
            while content.contains("  ") {
                content = content.replace("  ", " ");
            }
            if let Some(rest) = content.strip_prefix(". ") {
                content = rest.trim().to_string();
            }
        }
    }
    content
}

/// Keeps only the save tool's message, dropping any explanation around it.
pub fn extract_save_tool_message(content: &str) -> String {
    if content.trim().is_empty() {
        return content.to_string();
    }

    if let Some(start) = content.find(SAVED_START) {
        return slice_until(content, start, SAVED_END);
    }

    if content.contains(ALREADY_IN_DECK) || content.contains(DUPLICATE_END) {
        if let Some(start) = content.find(DUPLICATE_START) {
            return slice_until(content, start, DUPLICATE_END);
        }
    }

    content.to_string()
}

fn slice_until(content: &str, start: usize, end_phrase: &str) -> String {
    match content[start..].find(end_phrase) {
        Some(offset) => content[start..start + offset + end_phrase.len()].trim().to_string(),
        None => content[start..].trim().to_string(),
    }
}
