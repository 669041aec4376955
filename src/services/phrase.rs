use serde::{Deserialize, Serialize};

use crate::services::agent::{run_agent, AgentError, AgentOutcome, AgentSpec, NoTools};
use crate::services::llm_provider::ChatModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseOutput {
    pub phrase: String,
    /// The words the phrase actually uses.
    #[serde(default)]
    pub words: Vec<String>,
}

fn phrase_agent(words: &[String], user_context: &str) -> AgentSpec {
    let words_json = serde_json::to_string(words).unwrap_or_else(|_| "[]".to_string());
    let context_json = serde_json::to_string(user_context).unwrap_or_else(|_| "\"\"".to_string());

    AgentSpec {
        role: "Phrase Writer",
        goal: "Write one short, natural practice phrase that uses the learner's vocabulary",
        backstory: "You write example sentences for language learners. Your sentences sound like \
            something a native speaker would say, stay short, and connect to the learner's life when \
            you know something about it.",
        task: format!(
            "Write one phrase that uses as many of these words as reads naturally (at least one).\n\
             Words: {words_json}\n\
             Learner context: {context_json}\n\
             List in `words` exactly the given words you used."
        ),
        expected_output: r#"{"phrase": string, "words": [string]}"#,
    }
}

#[tracing::instrument(skip_all, fields(word_count = words.len()))]
pub async fn generate_random_phrase<M: ChatModel>(
    model: &M,
    words: &[String],
    user_context: &str,
) -> Result<PhraseOutput, AgentError> {
    let spec = phrase_agent(words, user_context);
    let output = match run_agent::<_, _, PhraseOutput>(model, &spec, &NoTools).await? {
        AgentOutcome::Structured(mut output) => {
            if output.words.is_empty() {
                output.words = words.to_vec();
            }
            output
        }
        AgentOutcome::Raw(raw) => PhraseOutput { phrase: raw, words: words.to_vec() },
    };
    Ok(output)
}
