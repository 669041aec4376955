use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::response::AppError;
use crate::routes::agent_error;
use crate::services::similar_words::{self, SimilarWordsOutput};
use crate::state::AppState;

pub async fn similar_words(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SimilarWordsOutput>, AppError> {
    let (word1, word2) = parse_pair(body.ok().map(|Json(v)| v))?;
    let llm = state.llm();

    let output = similar_words::get_similar_words(llm.as_ref(), &word1, &word2)
        .await
        .map_err(agent_error)?;
    Ok(Json(output))
}

fn parse_pair(body: Option<Value>) -> Result<(String, String), AppError> {
    let body = body.unwrap_or(Value::Null);
    let (Some(word1), Some(word2)) = (body.get("word1"), body.get("word2")) else {
        return Err(AppError::validation("Request body must include 'word1' and 'word2'"));
    };

    let word1 = word1.as_str().unwrap_or_default().trim();
    let word2 = word2.as_str().unwrap_or_default().trim();
    if word1.is_empty() || word2.is_empty() {
        return Err(AppError::validation("'word1' and 'word2' must be non-empty"));
    }
    Ok((word1.to_string(), word2.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_pair_trims() {
        let pair = parse_pair(Some(json!({"word1": " dog ", "word2": "perro"}))).unwrap();
        assert_eq!(pair, ("dog".to_string(), "perro".to_string()));
    }

    #[test]
    fn test_parse_pair_missing_key() {
        assert!(parse_pair(Some(json!({"word1": "dog"}))).is_err());
        assert!(parse_pair(None).is_err());
    }

    #[test]
    fn test_parse_pair_blank_or_null() {
        assert!(parse_pair(Some(json!({"word1": "  ", "word2": "perro"}))).is_err());
        assert!(parse_pair(Some(json!({"word1": null, "word2": "perro"}))).is_err());
    }
}
