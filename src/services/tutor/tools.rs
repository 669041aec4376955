//! Flashcard deck tools offered to the translation and vocabulary agents.

use serde::Deserialize;

use crate::services::agent::Toolbox;
use crate::services::llm_provider::ToolSpec;
use crate::services::supabase::WordPairDeck;

pub const CHECK_WORD_PAIR: &str = "check_word_pair_in_deck";
pub const SAVE_WORD_PAIR: &str = "save_word_pair";

const NOT_IN_DECK: &str = "not in deck";

#[derive(Debug, Default, Deserialize)]
struct WordPairArgs {
    #[serde(default)]
    source_word: String,
    #[serde(default)]
    translated_word: String,
    /// Accepted for the model's benefit; the deck has no column for it.
    #[serde(default)]
    #[allow(dead_code)]
    context_sentence: Option<String>,
}

/// Deck tools bound to one user's deck. Without a deck no tools are offered.
pub struct DeckTools<'a, D> {
    deck: Option<&'a D>,
}

impl<'a, D: WordPairDeck> DeckTools<'a, D> {
    pub fn new(deck: Option<&'a D>) -> Self {
        Self { deck }
    }

    pub async fn check_word_pair(&self, source_word: &str, translated_word: &str) -> String {
        let (Some(deck), source, translated) = (self.deck, source_word.trim(), translated_word.trim())
        else {
            return NOT_IN_DECK.to_string();
        };
        if source.is_empty() || translated.is_empty() {
            return NOT_IN_DECK.to_string();
        }

        match contains_pair(deck, source, translated).await {
            Ok(true) => format!(
                "already in deck: This word pair ('{source}' → '{translated}') is already in your deck."
            ),
            Ok(false) => NOT_IN_DECK.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "deck lookup failed");
                NOT_IN_DECK.to_string()
            }
        }
    }

    pub async fn save_word_pair(&self, source_word: &str, translated_word: &str) -> String {
        let source = source_word.trim();
        let translated = translated_word.trim();
        if source.is_empty() || translated.is_empty() {
            return "Cannot save: both source_word and translated_word are required.".to_string();
        }
        let Some(deck) = self.deck else {
            return "Failed to save the word pair: no deck is available for this user".to_string();
        };

        match contains_pair(deck, source, translated).await {
            Ok(true) => {
                return format!(
                    "This word pair ('{source}' → '{translated}') is already in your deck. No duplicate was created."
                );
            }
            Ok(false) => {}
            Err(err) => return format!("Failed to save the word pair: {err}"),
        }

        match deck.insert_word_pair(source, translated).await {
            Ok(()) => {
                tracing::info!("word pair saved to deck");
                format!(
                    "Done! I've added '{source}' → '{translated}' to your flashcard deck. You'll see it in your next practice session."
                )
            }
            Err(err) => format!("Failed to save the word pair: {err}"),
        }
    }
}

async fn contains_pair<D: WordPairDeck>(
    deck: &D,
    source: &str,
    translated: &str,
) -> Result<bool, crate::services::supabase::SupabaseError> {
    let source = source.to_lowercase();
    let translated = translated.to_lowercase();
    let rows = deck.word_pairs().await?;
    Ok(rows.iter().any(|row| {
        row.word1.as_deref().unwrap_or_default().to_lowercase() == source
            && row.word2.as_deref().unwrap_or_default().to_lowercase() == translated
    }))
}

fn word_pair_parameters(with_context: bool) -> serde_json::Value {
    let mut properties = serde_json::json!({
        "source_word": {
            "type": "string",
            "description": "The word in the user's native language"
        },
        "translated_word": {
            "type": "string",
            "description": "The translation in the target language"
        }
    });
    if with_context {
        properties["context_sentence"] = serde_json::json!({
            "type": "string",
            "description": "An example sentence using the word"
        });
    }
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": ["source_word", "translated_word"]
    })
}

impl<'a, D: WordPairDeck> Toolbox for DeckTools<'a, D> {
    fn specs(&self) -> Vec<ToolSpec> {
        if self.deck.is_none() {
            return Vec::new();
        }
        vec![
            ToolSpec {
                name: CHECK_WORD_PAIR,
                description: "Check if a word pair is already in the user's flashcard deck. \
                    Call this BEFORE offering to save, when you have just given a translation or new word. \
                    If the result is 'already in deck', do NOT offer to save; say the pair is already in the deck. \
                    If the result is 'not in deck', then offer to save.",
                parameters: word_pair_parameters(false),
            },
            ToolSpec {
                name: SAVE_WORD_PAIR,
                description: "Save a word and its translation to the user's personal flashcard deck for future practice. \
                    Use when the user confirms they want to save (e.g. 'Yes, save it!'). \
                    If the pair already exists, the tool returns a message saying so; tell the user that exactly.",
                parameters: word_pair_parameters(true),
            },
        ]
    }

    async fn invoke(&self, name: &str, arguments: &str) -> String {
        let args: WordPairArgs = if arguments.trim().is_empty() {
            WordPairArgs::default()
        } else {
            match serde_json::from_str(arguments) {
                Ok(args) => args,
                Err(err) => return format!("Invalid arguments for {name}: {err}"),
            }
        };

        match name {
            CHECK_WORD_PAIR => self.check_word_pair(&args.source_word, &args.translated_word).await,
            SAVE_WORD_PAIR => self.save_word_pair(&args.source_word, &args.translated_word).await,
            other => format!("Unknown tool: {other}"),
        }
    }
}
