//! Mock chat completion backend for integration tests
//!
//! Serves the `OpenAI` and Azure routes and streams scripted SSE replies

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// Scripted streaming reply
#[derive(Debug, Clone)]
pub enum Reply {
    /// One content chunk per word, spacing preserved
    Text(String),
    /// A single tool call whose arguments arrive in two fragments
    ToolCall {
        /// Provider id; `None` omits it from every fragment
        id: Option<String>,
        /// Function name
        name: String,
        /// Complete JSON arguments
        arguments: String,
    },
    /// Raw SSE `data:` payloads, sent as-is before `[DONE]`
    Frames(Vec<String>),
}

/// A request as the mock received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request path
    pub path: String,
    /// Raw query string
    pub query: Option<String>,
    /// Request headers
    pub headers: HeaderMap,
    /// JSON body (`Null` for GET requests)
    pub body: serde_json::Value,
}

/// Mock backend that returns scripted responses
pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockLlmState>,
}

struct MockLlmState {
    completion_count: AtomicU32,
    models_count: AtomicU32,
    /// Number of completion requests to fail before succeeding
    fail_count: AtomicU32,
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockLlm {
    /// Start a mock server streaming `reply` for every completion
    pub async fn start(reply: Reply) -> anyhow::Result<Self> {
        Self::start_inner(reply, 0).await
    }

    /// Start a mock server that fails the first `n` completions with 500
    pub async fn start_failing(reply: Reply, n: u32) -> anyhow::Result<Self> {
        Self::start_inner(reply, n).await
    }

    async fn start_inner(reply: Reply, fail_count: u32) -> anyhow::Result<Self> {
        let state = Arc::new(MockLlmState {
            completion_count: AtomicU32::new(0),
            models_count: AtomicU32::new(0),
            fail_count: AtomicU32::new(fail_count),
            reply,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route(
                "/openai/deployments/{deployment}/chat/completions",
                routing::post(handle_chat_completions),
            )
            .route("/v1/models", routing::get(handle_models))
            .route("/openai/models", routing::get(handle_models))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for the `OpenAI` dialect
    ///
    /// Includes `/v1` since the transport appends paths like `/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Base URL for the Azure dialect
    pub fn root_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of completion requests received
    pub fn completion_count(&self) -> u32 {
        self.state.completion_count.load(Ordering::Relaxed)
    }

    /// Number of model list requests received
    pub fn models_count(&self) -> u32 {
        self.state.models_count.load(Ordering::Relaxed)
    }

    /// Most recent request of any kind
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().unwrap().last().cloned()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn record(state: &MockLlmState, uri: &Uri, headers: HeaderMap, body: serde_json::Value) {
    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_owned(),
        query: uri.query().map(str::to_owned),
        headers,
        body,
    });
}

// -- Handlers --

async fn handle_chat_completions(
    State(state): State<Arc<MockLlmState>>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.completion_count.fetch_add(1, Ordering::Relaxed);
    let model = body["model"].as_str().unwrap_or_default().to_owned();
    record(&state, &uri, headers, body);

    let remaining = state.fail_count.load(Ordering::Relaxed);
    if remaining > 0 {
        state.fail_count.fetch_sub(1, Ordering::Relaxed);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": {
                    "message": "mock server intentional failure",
                    "type": "server_error"
                }
            })),
        )
            .into_response();
    }

    let mut body = String::new();
    for frame in frames(&state.reply, &model) {
        body.push_str(&format!("data: {frame}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
        .into_response()
}

async fn handle_models(State(state): State<Arc<MockLlmState>>, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    state.models_count.fetch_add(1, Ordering::Relaxed);
    record(&state, &uri, headers, serde_json::Value::Null);

    Json(serde_json::json!({
        "object": "list",
        "data": [
            {"id": "mock-model-b", "object": "model", "owned_by": "mock"},
            {"id": "gpt-4-turbo-preview", "object": "model", "owned_by": "mock"},
            {"id": "mock-model-a", "object": "model", "owned_by": "mock"}
        ]
    }))
}

// -- Stream scripting --

fn chunk(model: &str, delta: serde_json::Value, finish_reason: Option<&str>) -> String {
    serde_json::json!({
        "id": "chatcmpl-test-stream",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000u64,
        "model": model,
        "choices": [{"index": 0, "delta": delta, "finish_reason": finish_reason}]
    })
    .to_string()
}

fn frames(reply: &Reply, model: &str) -> Vec<String> {
    match reply {
        Reply::Text(content) => content
            .split_inclusive(' ')
            .map(|word| chunk(model, serde_json::json!({"content": word}), None))
            .collect(),
        Reply::ToolCall { id, name, arguments } => {
            let (head, tail) = arguments.split_at(arguments.len() / 2);
            let mut opening = serde_json::json!({
                "index": 0,
                "type": "function",
                "function": {"name": name, "arguments": head}
            });
            if let Some(id) = id {
                opening["id"] = serde_json::json!(id);
            }

            vec![
                chunk(model, serde_json::json!({"role": "assistant", "tool_calls": [opening]}), None),
                chunk(
                    model,
                    serde_json::json!({"tool_calls": [{"index": 0, "function": {"arguments": tail}}]}),
                    None,
                ),
                chunk(model, serde_json::json!({}), Some("tool_calls")),
            ]
        }
        Reply::Frames(frames) => frames.clone(),
    }
}
