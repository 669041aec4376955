use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::AccessToken;
use crate::response::AppError;
use crate::state::AppState;

/// Resolves the bearer token to a user through the hosted auth service and
/// stores `AuthUser` and `AccessToken` in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match crate::auth::extract_token(req.headers()) {
        Ok(token) => token,
        Err(err) => return AppError::unauthorized(err.to_string()).into_response(),
    };

    match crate::auth::verify_request_token(state.supabase(), &token).await {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "request authenticated");
            req.extensions_mut().insert(user);
            req.extensions_mut().insert(AccessToken(token));
            next.run(req).await
        }
        Err(err) => {
            tracing::info!(error = %err, "authentication rejected");
            AppError::unauthorized(err.to_string()).into_response()
        }
    }
}
