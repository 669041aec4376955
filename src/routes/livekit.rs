use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::response::{json_error, AppError};
use crate::services::livekit::{resolve_room_name, LiveKitError, RoomCredentials};
use crate::services::voice_quiz::{QuizBrief, PUBLIC_DECK_LIMIT};
use crate::state::AppState;

const NOT_CONFIGURED: &str = "LiveKit is not configured. Please set LIVEKIT_URL, \
LIVEKIT_API_KEY, and LIVEKIT_API_SECRET.";

pub async fn livekit_token(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RoomCredentials>, AppError> {
    let livekit = state.livekit();
    if !livekit.is_configured() {
        return Err(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "LIVEKIT_NOT_CONFIGURED",
            NOT_CONFIGURED,
        ));
    }

    // The body is optional; anything unreadable counts as "no room requested".
    let requested = body
        .ok()
        .and_then(|Json(v)| v.get("roomName").and_then(Value::as_str).map(str::to_string));
    let room_name = resolve_room_name(requested.as_deref(), &user.id);

    let credentials = livekit.issue_credentials(&user.id, &room_name).map_err(|err| match err {
        LiveKitError::NotConfigured => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "LIVEKIT_NOT_CONFIGURED", NOT_CONFIGURED)
        }
        other => AppError::internal(format!("Failed to create LiveKit token: {other}")),
    })?;

    if let Some(agent_name) = livekit.agent_name() {
        let pairs = state.supabase().public_word_pairs(PUBLIC_DECK_LIMIT).await;
        tracing::info!(pairs = pairs.len(), "loaded word pairs for voice quiz");
        let brief = QuizBrief::from_pairs(&pairs, &state.config().voice_target_language);

        if let Err(err) = livekit.dispatch_agent(agent_name, &room_name, &brief.to_metadata()).await {
            tracing::warn!(error = %err, room = %room_name, "failed to dispatch voice agent");
        }
    }

    Ok(Json(credentials))
}
