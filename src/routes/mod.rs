mod health;
mod livekit;
mod phrases;
mod similar_words;
mod tutor;

use axum::http::StatusCode;
use axum::middleware;
use axum::routing::post;
use axum::Router;

use crate::middleware::auth::require_auth;
use crate::response::{json_error, AppError};
use crate::services::agent::AgentError;
use crate::services::llm_provider::LLMError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/random-phrase", post(phrases::random_phrase))
        .route("/similar-words", post(similar_words::similar_words))
        .route("/tutor-chat", post(tutor::tutor_chat))
        .route("/livekit-token", post(livekit::livekit_token))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/api", api)
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

/// Maps agent failures onto HTTP errors. A missing model key is a
/// deployment problem the caller can be told about; everything else is
/// logged and hidden.
pub(crate) fn agent_error(err: AgentError) -> AppError {
    match err {
        AgentError::Llm(LLMError::NotConfigured(what)) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            format!("AI service is not configured ({what})"),
        ),
        other => AppError::internal(format!("An error occurred: {other}")),
    }
}

async fn fallback_handler() -> AppError {
    AppError::not_found("Endpoint not found")
}
