use super::schemas::ConversationMessage;
use crate::services::agent::AgentSpec;

const INTENT_LIST: &str = "translation, new_vocabulary, grammar_explanation, writing_correction, \
cultural_context, small_talk_language_related, off_topic";

const TUTOR_MESSAGE_SHAPE: &str = r#"{"content": string, "intent": one of the intents, "word_card": {"word": string, "translation": string, "example_sentence": string, "explanation": string|null, "part_of_speech": string|null} | null, "actions": [{"type": string, "payload": object}]}"#;

pub struct TutorInputs<'a> {
    pub messages: &'a [ConversationMessage],
    pub user_context: &'a str,
}

impl TutorInputs<'_> {
    fn render(&self) -> String {
        let conversation =
            serde_json::to_string_pretty(self.messages).unwrap_or_else(|_| "[]".to_string());
        let context = if self.user_context.trim().is_empty() {
            "(none)"
        } else {
            self.user_context
        };
        format!("Conversation so far (oldest first):\n{conversation}\n\nLearner profile:\n{context}")
    }
}

pub fn router(inputs: &TutorInputs<'_>) -> AgentSpec {
    AgentSpec {
        role: "Tutor Router",
        goal: "Classify what the learner wants from the latest message and decide who should answer it",
        backstory: "You triage messages for a team of language tutors. You only let through requests \
            about learning languages: translations, vocabulary, grammar, writing, culture and small talk \
            practised in the target language.",
        task: format!(
            "{}\n\nClassify the learner's latest message into exactly one intent from: {INTENT_LIST}. \
             Set allowed_domain to false only for requests unrelated to language learning, and then \
             write a short, friendly refusal_message. Otherwise write a one or two sentence \
             specialist_instruction telling the specialist what to do.",
            inputs.render()
        ),
        expected_output: r#"{"intent": string, "allowed_domain": boolean, "specialist_instruction": string, "refusal_message": string|null}"#,
    }
}

pub fn translation(inputs: &TutorInputs<'_>, instruction: &str) -> AgentSpec {
    AgentSpec {
        role: "Translation Agent",
        goal: "Translate words and phrases accurately, with a short explanation and an example",
        backstory: "You are a precise, encouraging translator for language learners. After translating a \
            single word you check the learner's flashcard deck with check_word_pair_in_deck: if the pair is \
            already there, say so; if not, ask 'Would you like me to save this word to your flashcard deck?'. \
            When the learner confirms, call save_word_pair.",
        task: format!("{}\n\nInstruction from the router: {instruction}", inputs.render()),
        expected_output: r#"{"content": string}"#,
    }
}

pub fn vocabulary(inputs: &TutorInputs<'_>, instruction: &str) -> AgentSpec {
    AgentSpec {
        role: "Vocabulary Agent",
        goal: "Introduce useful new words that fit the learner's level and interests",
        backstory: "You build vocabulary one word at a time. Each new word comes with a word card \
            (word, translation, example sentence, optional explanation and part of speech). Before offering \
            to save a word you call check_word_pair_in_deck; if it is new, ask 'Would you like me to add this \
            word to your flashcard deck?' and include an add_to_flashcards action. When the learner \
            confirms, call save_word_pair.",
        task: format!("{}\n\nInstruction from the router: {instruction}", inputs.render()),
        expected_output: TUTOR_MESSAGE_SHAPE,
    }
}

pub fn generic(inputs: &TutorInputs<'_>, instruction: &str) -> AgentSpec {
    AgentSpec {
        role: "Language Tutor",
        goal: "Explain grammar, correct writing and give cultural context in a clear, friendly way",
        backstory: "You are a patient language tutor. You keep answers short, use examples, and correct \
            mistakes gently by showing the corrected sentence first.",
        task: format!("{}\n\nInstruction from the router: {instruction}", inputs.render()),
        expected_output: TUTOR_MESSAGE_SHAPE,
    }
}
