use axum::http::{header, HeaderMap};
use serde::Serialize;
use thiserror::Error;

use crate::services::supabase::{SupabaseClient, SupabaseError};

#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub role: String,
}

/// The caller's bearer token, kept so downstream table access runs under
/// the caller's row-level policies.
#[derive(Clone)]
pub struct AccessToken(pub String);

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingToken,
    #[error("Invalid authorization header format")]
    InvalidHeader,
    #[error("Authentication failed: {0}")]
    Rejected(#[from] SupabaseError),
}

/// Reads the token from `Authorization`. `Bearer <token>` and a bare token
/// are both accepted.
pub fn extract_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader)?
        .trim();

    if raw.is_empty() {
        return Err(AuthError::MissingToken);
    }
    if raw.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidHeader);
    }

    let mut parts = raw.split_whitespace();
    let first = parts.next().ok_or(AuthError::MissingToken)?;
    let token = parts.next().unwrap_or(first);
    Ok(token.to_string())
}

pub async fn verify_request_token(
    supabase: &SupabaseClient,
    token: &str,
) -> Result<AuthUser, AuthError> {
    Ok(supabase.get_user(token).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_token(&headers_with("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn test_extract_bare_token() {
        assert_eq!(extract_token(&headers_with("abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn test_extra_segments_after_token_are_ignored() {
        assert_eq!(extract_token(&headers_with("Bearer abc.def extra")).unwrap(), "abc.def");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(extract_token(&HeaderMap::new()), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_scheme_without_token() {
        assert!(matches!(extract_token(&headers_with("Bearer ")), Err(AuthError::InvalidHeader)));
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken("secret".into());
        assert_eq!(format!("{token:?}"), "AccessToken(..)");
    }
}
