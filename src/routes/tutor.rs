use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::Json;
use serde_json::Value;

use crate::auth::{AccessToken, AuthUser};
use crate::response::AppError;
use crate::routes::agent_error;
use crate::services::tutor::{self, ConversationMessage, Role, TutorMessage};
use crate::state::AppState;

pub async fn tutor_chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(token): Extension<AccessToken>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TutorMessage>, AppError> {
    let messages = parse_messages(body.ok().map(|Json(v)| v))?;

    let supabase = state.supabase();
    let user_context = supabase.profile_context(&user.id).await.unwrap_or_default();
    let deck = supabase.user_deck(user.id.clone(), token.0);
    let llm = state.llm();

    let reply = tutor::run_tutor_router(llm.as_ref(), &messages, &user_context, Some(&deck))
        .await
        .map_err(agent_error)?;
    Ok(Json(reply))
}

/// Keeps well-formed turns only: a known role and non-blank content.
fn parse_messages(body: Option<Value>) -> Result<Vec<ConversationMessage>, AppError> {
    let Some(messages) = body.as_ref().and_then(|b| b.get("messages")) else {
        return Err(AppError::validation("Request body must include 'messages' array"));
    };

    let items = match messages.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(AppError::validation("'messages' must be a non-empty array")),
    };

    let messages: Vec<ConversationMessage> = items
        .iter()
        .filter_map(|item| {
            let role = item.get("role")?.as_str()?.trim();
            let content = item.get("content")?.as_str()?.trim();
            if content.is_empty() {
                return None;
            }
            Some(ConversationMessage::new(Role::parse(role)?, content))
        })
        .collect();

    if messages.is_empty() {
        return Err(AppError::validation("No valid messages provided"));
    }
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_messages_filters_invalid_turns() {
        let messages = parse_messages(Some(json!({
            "messages": [
                {"role": "user", "content": "  hola  "},
                {"role": "tool", "content": "ignored"},
                {"role": "assistant", "content": "   "},
                {"role": "assistant"},
                "not an object",
                {"role": " system ", "content": "be nice"}
            ]
        })))
        .unwrap();

        assert_eq!(
            messages,
            vec![
                ConversationMessage::new(Role::User, "hola"),
                ConversationMessage::new(Role::System, "be nice"),
            ]
        );
    }

    #[test]
    fn test_parse_messages_errors() {
        assert!(parse_messages(None).is_err());
        assert!(parse_messages(Some(json!({"messages": []}))).is_err());
        assert!(parse_messages(Some(json!({"messages": {"role": "user"}}))).is_err());

        let err = parse_messages(Some(json!({"messages": [{"role": "bot", "content": "x"}]}))).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
