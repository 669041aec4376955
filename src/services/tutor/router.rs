use super::confirmation::{
    detect_save_confirmation, extract_save_tool_message, is_save_confirmation_instruction,
    strip_offer_when_already_in_deck, SAVE_CONFIRMATION_INSTRUCTION,
};
use super::prompts::{self, TutorInputs};
use super::schemas::{
    ConversationMessage, Intent, RouterDecision, SpecialistReply, TranslationOutput, TutorMessage,
};
use super::tools::DeckTools;
use crate::services::agent::{run_agent, AgentError, AgentOutcome, NoTools};
use crate::services::llm_provider::ChatModel;
use crate::services::supabase::WordPairDeck;

pub const TRANSLATION_AGENT: &str = "Translation Agent";
pub const VOCABULARY_AGENT: &str = "Vocabulary Agent";
pub const LANGUAGE_TUTOR: &str = "Language Tutor";

const DEFAULT_REFUSAL: &str = "I'm your language tutor and can only help with language-related questions. \
Try asking about translations, vocabulary, grammar, or cultural context!";

/// Classifies the conversation, then hands it to the matching specialist.
#[tracing::instrument(skip_all, fields(messages = messages.len(), has_deck = deck.is_some()))]
pub async fn run_tutor_router<M, D>(
    model: &M,
    messages: &[ConversationMessage],
    user_context: &str,
    deck: Option<&D>,
) -> Result<TutorMessage, AgentError>
where
    M: ChatModel,
    D: WordPairDeck,
{
    let inputs = TutorInputs { messages, user_context };

    let decision = match run_agent::<_, _, RouterDecision>(model, &prompts::router(&inputs), &NoTools).await? {
        AgentOutcome::Structured(decision) => decision,
        AgentOutcome::Raw(raw) => return Ok(TutorMessage::text(raw, Intent::OffTopic, None)),
    };
    let decision = apply_save_confirmation(decision, messages);
    tracing::info!(intent = decision.intent.as_str(), allowed = decision.allowed_domain, "tutor intent classified");

    if !decision.allowed_domain {
        let refusal = decision
            .refusal_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REFUSAL.to_string());
        return Ok(TutorMessage::text(refusal, Intent::OffTopic, None));
    }

    let instruction = decision.specialist_instruction.as_str();
    let confirming = is_save_confirmation_instruction(instruction);
    let tools = DeckTools::new(deck);

    match decision.intent {
        Intent::Translation => {
            let spec = prompts::translation(&inputs, instruction);
            let content = match run_agent::<_, _, TranslationOutput>(model, &spec, &tools).await? {
                AgentOutcome::Structured(output) => output.content,
                AgentOutcome::Raw(raw) => raw,
            };
            let content = finish_deck_reply(&content, confirming);
            Ok(TutorMessage::text(content, Intent::Translation, Some(TRANSLATION_AGENT)))
        }
        Intent::NewVocabulary => {
            let spec = prompts::vocabulary(&inputs, instruction);
            match run_agent::<_, _, SpecialistReply>(model, &spec, &tools).await? {
                AgentOutcome::Structured(reply) => {
                    let mut message = specialist_message(reply, Intent::NewVocabulary, VOCABULARY_AGENT);
                    message.content = finish_deck_reply(&message.content, confirming);
                    if confirming {
                        message.word_card = None;
                    }
                    Ok(message)
                }
                AgentOutcome::Raw(raw) => {
                    let content = if confirming { extract_save_tool_message(&raw) } else { raw };
                    Ok(TutorMessage::text(content, Intent::NewVocabulary, Some(VOCABULARY_AGENT)))
                }
            }
        }
        intent => {
            let spec = prompts::generic(&inputs, instruction);
            match run_agent::<_, _, SpecialistReply>(model, &spec, &NoTools).await? {
                AgentOutcome::Structured(reply) => Ok(specialist_message(reply, intent, LANGUAGE_TUTOR)),
                AgentOutcome::Raw(raw) => Ok(TutorMessage::text(raw, intent, Some(LANGUAGE_TUTOR))),
            }
        }
    }
}

/// A "yes, save it" after a save offer must reach an agent holding the deck
/// tools, whatever the router thought.
fn apply_save_confirmation(decision: RouterDecision, messages: &[ConversationMessage]) -> RouterDecision {
    match detect_save_confirmation(messages) {
        Some(intent) if decision.allowed_domain && !decision.intent.uses_deck_tools() => {
            tracing::debug!(from = decision.intent.as_str(), to = intent.as_str(), "save confirmation override");
            RouterDecision {
                intent,
                specialist_instruction: SAVE_CONFIRMATION_INSTRUCTION.to_string(),
                ..decision
            }
        }
        _ => decision,
    }
}

fn finish_deck_reply(content: &str, confirming: bool) -> String {
    if confirming && !content.is_empty() {
        extract_save_tool_message(content)
    } else {
        strip_offer_when_already_in_deck(content)
    }
}

fn specialist_message(reply: SpecialistReply, fallback_intent: Intent, agent: &str) -> TutorMessage {
    TutorMessage {
        content: reply.content,
        intent: reply.intent.unwrap_or(fallback_intent),
        word_card: reply.word_card,
        actions: reply.actions,
        ..TutorMessage::text(String::new(), fallback_intent, Some(agent))
    }
}
