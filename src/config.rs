use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::services::llm_provider::LLMConfig;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SUPABASE_URL: &str = "http://127.0.0.1:54321";
const DEFAULT_TOKEN_TTL: &str = "6h";
const DEFAULT_VOICE_LANGUAGE: &str = "Portuguese";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:3000",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub file_logs: bool,
    pub log_dir: PathBuf,
    pub cors_origins: Vec<String>,
    pub supabase: SupabaseConfig,
    pub livekit: LiveKitConfig,
    pub llm: LLMConfig,
    pub voice_target_language: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct LiveKitConfig {
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
    pub agent_name: Option<String>,
    pub token_ttl: Duration,
}

impl LiveKitConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
            && !self.api_key.trim().is_empty()
            && !self.api_secret.trim().is_empty()
    }
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_string("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let host = env_string("HOST")
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = env_string("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let file_logs = env_string("ENABLE_FILE_LOGS").is_some_and(|raw| parse_flag(&raw));
        let log_dir = PathBuf::from(env_string("LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()));

        let cors_origins = env_string("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect());

        let token_ttl = env_string("LIVEKIT_TOKEN_TTL")
            .and_then(|raw| parse_duration(&raw))
            .or_else(|| parse_duration(DEFAULT_TOKEN_TTL))
            .unwrap_or(Duration::from_secs(6 * 60 * 60));

        Self {
            host,
            port,
            log_level,
            file_logs,
            log_dir,
            cors_origins,
            supabase: SupabaseConfig {
                url: env_string("SUPABASE_URL").unwrap_or_else(|| DEFAULT_SUPABASE_URL.to_string()),
                anon_key: env_string("SUPABASE_ANON_KEY").unwrap_or_default(),
            },
            livekit: LiveKitConfig {
                url: env_string("LIVEKIT_URL").unwrap_or_default(),
                api_key: env_string("LIVEKIT_API_KEY").unwrap_or_default(),
                api_secret: env_string("LIVEKIT_API_SECRET").unwrap_or_default(),
                agent_name: env_string("LIVEKIT_AGENT_NAME"),
                token_ttl,
            },
            llm: LLMConfig::from_env(),
            voice_target_language: env_string("VOICE_TARGET_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_VOICE_LANGUAGE.to_string()),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `<amount><unit>` where unit is one of `s`, `m`, `h`, `d`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let trimmed = value.trim();
    if trimmed.len() < 2 || !trimmed.is_ascii() {
        return None;
    }

    let (digits, unit) = trimmed.split_at(trimmed.len() - 1);
    let amount: u64 = digits.parse().ok()?;
    if amount == 0 {
        return None;
    }

    let secs = match unit {
        "s" => amount,
        "m" => amount.checked_mul(60)?,
        "h" => amount.checked_mul(60 * 60)?,
        "d" => amount.checked_mul(24 * 60 * 60)?,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}
