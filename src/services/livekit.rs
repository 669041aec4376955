use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

use crate::config::LiveKitConfig;

const ROOM_PREFIX: &str = "wordpan-voice-";
const ADMIN_TOKEN_TTL: Duration = Duration::from_secs(10 * 60);
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);
const DISPATCH_PATH: &str = "/twirp/livekit.AgentDispatchService/CreateDispatch";

#[derive(Debug, Error)]
pub enum LiveKitError {
    #[error("LiveKit is not configured")]
    NotConfigured,
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("dispatch request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("dispatch rejected with HTTP {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub room_join: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub room_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_publish: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_subscribe: Option<bool>,
}

impl VideoGrant {
    pub fn participant(room: &str) -> Self {
        Self {
            room: Some(room.to_string()),
            room_join: true,
            room_admin: false,
            can_publish: Some(true),
            can_subscribe: Some(true),
        }
    }

    pub fn admin(room: &str) -> Self {
        Self {
            room: Some(room.to_string()),
            room_admin: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
    nbf: i64,
    exp: i64,
    jti: String,
    video: &'a VideoGrant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCredentials {
    pub token: String,
    pub url: String,
    pub room_name: String,
}

/// Uses the requested room name, or the user's personal practice room.
pub fn resolve_room_name(requested: Option<&str>, user_id: &str) -> String {
    requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{ROOM_PREFIX}{user_id}"))
}

/// Signs an HS256 access token in the media server's claim format.
pub fn sign_access_token(
    api_key: &str,
    api_secret: &str,
    identity: Option<&str>,
    grant: &VideoGrant,
    ttl: Duration,
) -> Result<String, LiveKitError> {
    let now = Utc::now().timestamp();
    let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|e| LiveKitError::Signing(e.to_string()))?;

    let claims = Claims {
        iss: api_key,
        sub: identity,
        nbf: now,
        exp: now + ttl_secs,
        jti: identity
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        video: grant,
    };

    let header_json = serde_json::json!({
        "alg": "HS256",
        "typ": "JWT",
    });

    let header_b64 = URL_SAFE_NO_PAD
        .encode(serde_json::to_vec(&header_json).map_err(|e| LiveKitError::Signing(e.to_string()))?);
    let payload_b64 = URL_SAFE_NO_PAD
        .encode(serde_json::to_vec(&claims).map_err(|e| LiveKitError::Signing(e.to_string()))?);
    let signing_input = format!("{header_b64}.{payload_b64}");

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .map_err(|e| LiveKitError::Signing(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{sig_b64}"))
}

/// `wss://` and `ws://` server URLs map to their HTTP API origin.
fn api_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if let Some(rest) = trimmed.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        trimmed.to_string()
    }
}

#[derive(Clone)]
pub struct LiveKitService {
    config: LiveKitConfig,
    client: reqwest::Client,
}

impl LiveKitService {
    pub fn new(config: LiveKitConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DISPATCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn agent_name(&self) -> Option<&str> {
        self.config.agent_name.as_deref().filter(|name| !name.trim().is_empty())
    }

    #[tracing::instrument(skip(self))]
    pub fn issue_credentials(&self, user_id: &str, room_name: &str) -> Result<RoomCredentials, LiveKitError> {
        if !self.is_configured() {
            return Err(LiveKitError::NotConfigured);
        }

        let token = sign_access_token(
            &self.config.api_key,
            &self.config.api_secret,
            Some(user_id),
            &VideoGrant::participant(room_name),
            self.config.token_ttl,
        )?;

        Ok(RoomCredentials {
            token,
            url: self.config.url.clone(),
            room_name: room_name.to_string(),
        })
    }

    /// Asks the media server to send the named voice agent into the room.
    #[tracing::instrument(skip(self, metadata))]
    pub async fn dispatch_agent(
        &self,
        agent_name: &str,
        room_name: &str,
        metadata: &str,
    ) -> Result<(), LiveKitError> {
        if !self.is_configured() {
            return Err(LiveKitError::NotConfigured);
        }

        let admin_token = sign_access_token(
            &self.config.api_key,
            &self.config.api_secret,
            None,
            &VideoGrant::admin(room_name),
            ADMIN_TOKEN_TTL,
        )?;

        let url = format!("{}{}", api_base_url(&self.config.url), DISPATCH_PATH);
        let body = serde_json::json!({
            "agent_name": agent_name,
            "room": room_name,
            "metadata": metadata,
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(admin_token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LiveKitError::HttpStatus { status, body });
        }

        tracing::info!("voice agent dispatched");
        Ok(())
    }
}
