use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::services::agent::{run_agent, AgentError, AgentOutcome, AgentSpec, NoTools};
use crate::services::llm_provider::ChatModel;

pub const MAX_SIMILAR_WORDS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarWordsOutput {
    pub similar_words: Vec<String>,
}

fn similar_words_agent(word1: &str, word2: &str) -> AgentSpec {
    AgentSpec {
        role: "Vocabulary Assistant",
        goal: "Suggest words that are worth learning next to a given word pair",
        backstory: "You help learners grow their vocabulary in clusters: synonyms, closely related \
            terms and words that are commonly used together.",
        task: format!(
            "The learner is studying the pair \"{word1}\" / \"{word2}\". Suggest between 1 and \
             {MAX_SIMILAR_WORDS} related words (synonyms, related terms, or words that pair well)."
        ),
        expected_output: r#"{"similar_words": [string]}"#,
    }
}

#[tracing::instrument(skip_all)]
pub async fn get_similar_words<M: ChatModel>(
    model: &M,
    word1: &str,
    word2: &str,
) -> Result<SimilarWordsOutput, AgentError> {
    let spec = similar_words_agent(word1, word2);
    let similar_words = match run_agent::<_, _, SimilarWordsOutput>(model, &spec, &NoTools).await? {
        AgentOutcome::Structured(output) => {
            let words = normalize(output.similar_words);
            if words.is_empty() {
                tracing::warn!("similar words agent returned no usable words");
                return Err(AgentError::EmptyOutput);
            }
            words
        }
        AgentOutcome::Raw(raw) => vec![raw],
    };
    Ok(SimilarWordsOutput { similar_words })
}

/// Trims, drops blanks and case-insensitive repeats, caps the list.
fn normalize(words: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty() && seen.insert(w.to_lowercase()))
        .take(MAX_SIMILAR_WORDS)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::services::agent::testing::{json_reply, ScriptedModel};
    use crate::services::llm_provider::ChatMessage;

    #[test]
    fn test_normalize_dedupes_and_caps() {
        let mut input: Vec<String> = vec![" Dog ".into(), "dog".into(), "".into(), "puppy".into()];
        input.extend((0..20).map(|i| format!("word{i}")));
        let output = normalize(input);
        assert_eq!(output[0], "Dog");
        assert_eq!(output[1], "puppy");
        assert_eq!(output.len(), MAX_SIMILAR_WORDS);
    }

    #[tokio::test]
    async fn test_structured_similar_words() {
        let model = ScriptedModel::new(vec![json_reply(json!({"similar_words": ["cachorro", "perro"]}))]);
        let output = get_similar_words(&model, "dog", "perro").await.unwrap();
        assert_eq!(output.similar_words, vec!["cachorro", "perro"]);
    }

    #[tokio::test]
    async fn test_raw_similar_words() {
        let model = ScriptedModel::new(vec![ChatMessage::assistant("cachorro, can")]);
        let output = get_similar_words(&model, "dog", "perro").await.unwrap();
        assert_eq!(output.similar_words, vec!["cachorro, can"]);
    }

    #[tokio::test]
    async fn test_empty_structured_list_is_an_error() {
        let model = ScriptedModel::new(vec![json_reply(json!({"similar_words": ["  "]}))]);
        assert!(matches!(
            get_similar_words(&model, "dog", "perro").await,
            Err(AgentError::EmptyOutput)
        ));
    }
}
