//! Thin client for the hosted backend: auth user lookup and the handful of
//! PostgREST tables the AI service reads or writes.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthUser;
use crate::config::SupabaseConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
    #[error("invalid user payload")]
    InvalidUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPairRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub word1: Option<String>,
    #[serde(default)]
    pub word2: Option<String>,
}

/// A pair from the shared deck used by the voice quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicWordPair {
    pub english: String,
    pub target: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Option<String>,
    email: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    context: Option<String>,
}

#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            client,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Builds a request carrying the anon key and, when given, the user's JWT
    /// so row-level policies evaluate as that user.
    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        access_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let resp = self
            .request(reqwest::Method::GET, &url, Some(access_token))
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let payload: UserPayload = resp.json().await?;

        let id = payload
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or(SupabaseError::InvalidUser)?;

        Ok(AuthUser {
            id,
            email: payload.email,
            role: payload.role.unwrap_or_else(|| "authenticated".to_string()),
        })
    }

    /// Profile context used to personalise prompts. Lookup failures are
    /// logged and treated as "no profile".
    pub async fn profile_context(&self, user_id: &str) -> Option<String> {
        match self.fetch_profile_context(user_id).await {
            Ok(context) => context,
            Err(err) => {
                tracing::warn!(error = %err, user_id, "failed to fetch user context");
                None
            }
        }
    }

    async fn fetch_profile_context(&self, user_id: &str) -> Result<Option<String>, SupabaseError> {
        let url = format!(
            "{}?select=context&id=eq.{}",
            self.rest_url("profiles"),
            urlencoding::encode(user_id)
        );
        let resp = self.request(reqwest::Method::GET, &url, None).send().await?;
        let rows: Vec<ProfileRow> = ensure_success(resp).await?.json().await?;

        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.context.unwrap_or_default()))
    }

    pub async fn public_word_pairs(&self, limit: usize) -> Vec<PublicWordPair> {
        match self.fetch_public_word_pairs(limit).await {
            Ok(pairs) => pairs,
            Err(err) => {
                tracing::error!(error = %err, "failed to load public word pairs");
                Vec::new()
            }
        }
    }

    async fn fetch_public_word_pairs(&self, limit: usize) -> Result<Vec<PublicWordPair>, SupabaseError> {
        let url = format!(
            "{}?select=word1,word2&user_id=is.null&limit={}",
            self.rest_url("word_pairs"),
            limit
        );
        let resp = self.request(reqwest::Method::GET, &url, None).send().await?;
        let rows: Vec<WordPairRow> = ensure_success(resp).await?.json().await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let english = row.word1.unwrap_or_default().trim().to_string();
                let target = row.word2.unwrap_or_default().trim().to_string();
                if english.is_empty() || target.is_empty() {
                    None
                } else {
                    Some(PublicWordPair { english, target })
                }
            })
            .collect())
    }

    pub fn user_deck(&self, user_id: impl Into<String>, access_token: impl Into<String>) -> UserDeck {
        UserDeck {
            client: self.clone(),
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SupabaseError::HttpStatus { status, body })
}

/// The flashcard deck of one user.
pub trait WordPairDeck: Send + Sync {
    fn word_pairs(&self) -> impl Future<Output = Result<Vec<WordPairRow>, SupabaseError>> + Send;

    fn insert_word_pair(
        &self,
        word1: &str,
        word2: &str,
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send;
}

#[derive(Clone)]
pub struct UserDeck {
    client: SupabaseClient,
    user_id: String,
    access_token: String,
}

impl WordPairDeck for UserDeck {
    async fn word_pairs(&self) -> Result<Vec<WordPairRow>, SupabaseError> {
        let url = format!(
            "{}?select=id,word1,word2&user_id=eq.{}",
            self.client.rest_url("word_pairs"),
            urlencoding::encode(&self.user_id)
        );
        let resp = self
            .client
            .request(reqwest::Method::GET, &url, Some(&self.access_token))
            .send()
            .await?;
        Ok(ensure_success(resp).await?.json().await?)
    }

    async fn insert_word_pair(&self, word1: &str, word2: &str) -> Result<(), SupabaseError> {
        let url = self.client.rest_url("word_pairs");
        let body = serde_json::json!({
            "user_id": self.user_id,
            "word1": word1,
            "word2": word2,
        });
        let resp = self
            .client
            .request(reqwest::Method::POST, &url, Some(&self.access_token))
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }
}
