use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::Json;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::response::AppError;
use crate::routes::agent_error;
use crate::services::phrase::{self, PhraseOutput};
use crate::state::AppState;

pub async fn random_phrase(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PhraseOutput>, AppError> {
    let words = parse_words(body.ok().map(|Json(v)| v))?;

    let user_context = state.supabase().profile_context(&user.id).await.unwrap_or_default();
    let llm = state.llm();

    let output = phrase::generate_random_phrase(llm.as_ref(), &words, &user_context)
        .await
        .map_err(agent_error)?;
    Ok(Json(output))
}

fn parse_words(body: Option<Value>) -> Result<Vec<String>, AppError> {
    let Some(words) = body.as_ref().and_then(|b| b.get("words")) else {
        return Err(AppError::validation("Request body must include 'words' array"));
    };

    let words = match words.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(AppError::validation("'words' must be a non-empty array")),
    };

    Ok(words
        .iter()
        .map(|w| match w {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect())
}
