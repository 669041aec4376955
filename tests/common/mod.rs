#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use wordpan_api::config::{Config, LiveKitConfig, SupabaseConfig};
use wordpan_api::services::llm_provider::LLMConfig;

pub const GOOD_TOKEN: &str = "good-token";
pub const USER_ID: &str = "user-1";

/// What the fake backend saw and what it should answer.
#[derive(Default)]
pub struct Recorded {
    pub llm_replies: VecDeque<Value>,
    pub llm_requests: Vec<Value>,
    pub deck: Vec<Value>,
    pub inserts: Vec<(Option<String>, Value)>,
    pub dispatches: Vec<Value>,
    pub fail_dispatch: bool,
}

#[derive(Clone, Default)]
pub struct Backend {
    pub recorded: Arc<Mutex<Recorded>>,
}

impl Backend {
    pub fn push_llm_reply(&self, message: Value) {
        self.recorded.lock().unwrap().llm_replies.push_back(message);
    }

    pub fn push_llm_json(&self, content: Value) {
        self.push_llm_reply(json!({"role": "assistant", "content": content.to_string()}));
    }

    pub fn push_llm_tool_call(&self, name: &str, arguments: Value) {
        self.push_llm_reply(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": format!("call_{name}"),
                "type": "function",
                "function": {"name": name, "arguments": arguments.to_string()}
            }]
        }));
    }

    pub fn llm_requests(&self) -> Vec<Value> {
        self.recorded.lock().unwrap().llm_requests.clone()
    }
}

/// A fake hosted backend, chat-completions endpoint and media server on one
/// local port.
pub async fn spawn_backend() -> (Backend, SocketAddr) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/auth/v1/user", get(auth_user))
        .route("/rest/v1/profiles", get(profiles))
        .route("/rest/v1/word_pairs", get(list_word_pairs).post(insert_word_pair))
        .route("/v1/chat/completions", post(chat_completions))
        .route("/twirp/livekit.AgentDispatchService/CreateDispatch", post(create_dispatch))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (backend, addr)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn auth_user(headers: HeaderMap) -> Response {
    if bearer(&headers).as_deref() == Some(GOOD_TOKEN) {
        Json(json!({"id": USER_ID, "email": "learner@example.com", "role": "authenticated"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"msg": "invalid JWT"}))).into_response()
    }
}

async fn profiles() -> Json<Value> {
    Json(json!([{"context": "Learning Spanish for travel"}]))
}

async fn list_word_pairs(State(backend): State<Backend>) -> Json<Value> {
    let recorded = backend.recorded.lock().unwrap();
    Json(Value::Array(recorded.deck.clone()))
}

async fn insert_word_pair(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let mut recorded = backend.recorded.lock().unwrap();
    recorded.deck.push(body.clone());
    recorded.inserts.push((bearer(&headers), body));
    StatusCode::CREATED
}

async fn chat_completions(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let mut recorded = backend.recorded.lock().unwrap();
    recorded.llm_requests.push(body);
    match recorded.llm_replies.pop_front() {
        Some(message) => Json(json!({
            "model": "mock",
            "choices": [{"message": message}],
            "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
        }))
        .into_response(),
        None => (StatusCode::BAD_REQUEST, "no scripted reply").into_response(),
    }
}

async fn create_dispatch(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let mut recorded = backend.recorded.lock().unwrap();
    recorded.dispatches.push(body);
    if recorded.fail_dispatch {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"code": "unavailable"}))).into_response();
    }
    Json(json!({"id": "dispatch-1"})).into_response()
}

pub fn test_config(addr: SocketAddr) -> Config {
    let base = format!("http://{addr}");
    Config {
        host: addr.ip(),
        port: 0,
        log_level: "info".into(),
        file_logs: false,
        log_dir: "./logs".into(),
        cors_origins: vec!["http://localhost:5173".into()],
        supabase: SupabaseConfig { url: base.clone(), anon_key: "anon-key".into() },
        livekit: LiveKitConfig {
            url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            agent_name: None,
            token_ttl: Duration::from_secs(3600),
        },
        llm: LLMConfig {
            api_key: Some("test-key".into()),
            model: "mock-model".into(),
            api_endpoint: format!("{base}/v1"),
            timeout: Duration::from_secs(5),
        },
        voice_target_language: "Spanish".into(),
    }
}

pub fn with_livekit(mut config: Config, addr: SocketAddr, agent_name: Option<&str>) -> Config {
    config.livekit = LiveKitConfig {
        url: format!("ws://{addr}"),
        api_key: "APIkey".into(),
        api_secret: "livekit-secret".into(),
        agent_name: agent_name.map(str::to_string),
        token_ttl: Duration::from_secs(3600),
    };
    config
}

pub async fn create_test_app() -> (Router, Backend) {
    let (backend, addr) = spawn_backend().await;
    (wordpan_api::create_app(test_config(addr)), backend)
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
