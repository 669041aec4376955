//! Brief for the voice practice agent: game rules plus the shared deck it
//! quizzes from. Sent to the media server as agent dispatch metadata.

use serde::Serialize;

use crate::services::supabase::PublicWordPair;

pub const PUBLIC_DECK_LIMIT: usize = 100;
const PREVIEW_PAIRS: usize = 20;

const GAME_RULES: &str = "You are a friendly language tutor helping the user practice vocabulary using a \
spoken translation game.

The game works like this:
- You say an English word and ask: \"How do you say '<english_word>' in the target language?\"
- The user answers in the target language.
- You check their answer against the correct translation.
- If the answer is correct, briefly confirm and repeat the English + target word.
- If the answer is incorrect, gently correct them and say the right translation.
- Then immediately move on to the next word.

After each answer, you MUST:
- Briefly say whether the answer was correct or incorrect.
- Say the correct translation.
- Immediately ask for the NEXT word from your vocabulary list.

Keep each turn short (ideally under 15-20 seconds of speech) and very focused on a single word.

Important behavior:
- Be encouraging and positive.
- Do not over-explain grammar unless the user explicitly asks.
- The game must CONTINUE WORD BY WORD until the user clearly says they want to stop.
- When the user asks to stop, briefly summarize how they did and end the session.

You have access to a list of (english_word -> target_translation) pairs for this session. Use ONLY \
those words for the quiz, one at a time, and cycle through them in order (or randomly) until the user \
asks you to stop.";

const INTRO_WITH_DECK: &str = "Let's start our vocabulary game! I have a list of English words and their \
translations in your target language. I will say an English word and you answer with the translation. \
I'll tell you if it's correct and then move on to the next word.";

const INTRO_WITHOUT_DECK: &str = "Let's start our vocabulary game! I will pick simple English words and \
you answer with the translation in your target language. I'll tell you if it's correct and then move on \
to the next word.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizBrief {
    pub instructions: String,
    pub intro: String,
    pub word_count: usize,
}

impl QuizBrief {
    pub fn from_pairs(pairs: &[PublicWordPair], target_language: &str) -> Self {
        let deck_hint = if pairs.is_empty() {
            format!(
                "\n\nNo external vocabulary list is available. Instead, you should pick simple and useful \
                 English words and translate them into {target_language} yourself, still following the \
                 same quiz pattern."
            )
        } else {
            let preview = pairs
                .iter()
                .take(PREVIEW_PAIRS)
                .map(|pair| format!("{} → {}", pair.english, pair.target))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "\n\nVocabulary for this session (english → {target_language}):\n{preview}\n\n\
                 Use only these pairs during the game. When you finish the list, you may loop back to \
                 the beginning."
            )
        };

        let intro = if pairs.is_empty() { INTRO_WITHOUT_DECK } else { INTRO_WITH_DECK };

        Self {
            instructions: format!("{GAME_RULES}{deck_hint}"),
            intro: intro.to_string(),
            word_count: pairs.len(),
        }
    }

    pub fn to_metadata(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(english: &str, target: &str) -> PublicWordPair {
        PublicWordPair { english: english.into(), target: target.into() }
    }

    #[test]
    fn test_brief_lists_deck_preview() {
        let brief = QuizBrief::from_pairs(&[pair("cat", "gato"), pair("house", "casa")], "Portuguese");
        assert!(brief.instructions.contains("english → Portuguese"));
        assert!(brief.instructions.contains("cat → gato, house → casa"));
        assert_eq!(brief.intro, INTRO_WITH_DECK);
        assert_eq!(brief.word_count, 2);
    }

    #[test]
    fn test_brief_preview_is_capped() {
        let pairs: Vec<PublicWordPair> =
            (0..30).map(|i| pair(&format!("en{i}"), &format!("pt{i}"))).collect();
        let brief = QuizBrief::from_pairs(&pairs, "Portuguese");
        assert!(brief.instructions.contains("en19 → pt19"));
        assert!(!brief.instructions.contains("en20 → pt20"));
        assert_eq!(brief.word_count, 30);
    }

    #[test]
    fn test_brief_without_deck() {
        let brief = QuizBrief::from_pairs(&[], "Spanish");
        assert!(brief.instructions.contains("translate them into Spanish yourself"));
        assert_eq!(brief.intro, INTRO_WITHOUT_DECK);
    }

    #[test]
    fn test_metadata_is_json() {
        let brief = QuizBrief::from_pairs(&[], "Spanish");
        let value: serde_json::Value = serde_json::from_str(&brief.to_metadata()).unwrap();
        assert_eq!(value["word_count"], 0);
    }
}
