use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Translation,
    NewVocabulary,
    GrammarExplanation,
    WritingCorrection,
    CulturalContext,
    SmallTalkLanguageRelated,
    OffTopic,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Translation => "translation",
            Self::NewVocabulary => "new_vocabulary",
            Self::GrammarExplanation => "grammar_explanation",
            Self::WritingCorrection => "writing_correction",
            Self::CulturalContext => "cultural_context",
            Self::SmallTalkLanguageRelated => "small_talk_language_related",
            Self::OffTopic => "off_topic",
        }
    }

    /// Intents whose specialist holds the deck tools.
    pub fn uses_deck_tools(&self) -> bool {
        matches!(self, Self::Translation | Self::NewVocabulary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterDecision {
    pub intent: Intent,
    pub allowed_domain: bool,
    #[serde(default)]
    pub specialist_instruction: String,
    #[serde(default)]
    pub refusal_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCard {
    pub word: String,
    pub translation: String,
    pub example_sentence: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub part_of_speech: Option<String>,
}

/// Something the frontend can act on, e.g. `add_to_flashcards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationOutput {
    pub content: String,
}

/// Reply shape produced by the vocabulary and generic tutor agents. The
/// intent may be omitted; the router's decision fills it in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpecialistReply {
    pub content: String,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub word_card: Option<WordCard>,
    #[serde(default)]
    pub actions: Vec<TutorAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantRole {
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorMessage {
    pub role: AssistantRole,
    pub content: String,
    pub intent: Intent,
    pub word_card: Option<WordCard>,
    pub actions: Vec<TutorAction>,
    pub delegated_agent: Option<String>,
}

impl TutorMessage {
    pub fn text(content: impl Into<String>, intent: Intent, delegated_agent: Option<&str>) -> Self {
        Self {
            role: AssistantRole::Assistant,
            content: content.into(),
            intent,
            word_card: None,
            actions: Vec::new(),
            delegated_agent: delegated_agent.map(str::to_string),
        }
    }
}
