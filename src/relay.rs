//! Chat-completions relay to the upstream OpenAI-compatible API.
//!
//! The HTTP layer hands over whatever the browser sent; missing fields
//! take the relay defaults, the bearer key is attached here, and the
//! upstream JSON comes back untouched. No retries, no streaming.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Upstream answered with a non-2xx status.
    #[error("API Error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("{0}")]
    Transport(String),

    #[error("Upstream returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("Cannot build HTTP client: {0}")]
    Client(String),
}

impl RelayError {
    /// Status the relay endpoint answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::Upstream { status, .. } => *status,
            _ => 500,
        }
    }
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Inbound body of `POST /api/ai`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Option<Value>,
    #[serde(default)]
    pub max_tokens: Option<Value>,
    #[serde(default)]
    pub temperature: Option<Value>,
}

/// Outbound body sent to `<upstream>/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub messages: Value,
    pub max_tokens: Value,
    pub temperature: Value,
}

/// Null, zero, `false` and the empty string count as "not given".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl From<RelayRequest> for ChatCompletionRequest {
    /// Numeric fields pass through as sent. Empty model names and a falsy
    /// token limit count as missing; temperature is replaced only when
    /// absent or null.
    fn from(req: RelayRequest) -> Self {
        Self {
            model: req
                .model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            messages: req.messages.unwrap_or(Value::Null),
            max_tokens: req
                .max_tokens
                .filter(|v| !is_falsy(v))
                .unwrap_or_else(|| Value::from(DEFAULT_MAX_TOKENS)),
            temperature: req
                .temperature
                .filter(|v| !v.is_null())
                .unwrap_or_else(|| Value::from(DEFAULT_TEMPERATURE)),
        }
    }
}

impl ChatCompletionRequest {
    pub fn new(messages: &[ChatMessage], max_tokens: u32, temperature: f64) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            messages: serde_json::to_value(messages).unwrap_or(Value::Null),
            max_tokens: Value::from(max_tokens),
            temperature: Value::from(temperature),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if there is any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()?
            .message
            .as_ref()
            .map(|m| m.content.as_str())
            .filter(|c| !c.is_empty())
    }
}

// ═══════════════════════════════════════════════════════════
// Client
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct RelayClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl RelayClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// POST the request and return the upstream JSON verbatim.
    pub async fn forward(&self, request: &ChatCompletionRequest) -> Result<Value, RelayError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut builder = self.client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        tracing::debug!(model = %request.model, max_tokens = %request.max_tokens, "Forwarding chat completion");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                RelayError::Transport(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                RelayError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Upstream completion failed");
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RelayError::InvalidResponse(e.to_string()))
    }

    /// Like [`forward`](Self::forward) but decoded into the completion shape.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, RelayError> {
        let raw = self.forward(request).await?;
        serde_json::from_value(raw).map_err(|e| RelayError::InvalidResponse(e.to_string()))
    }
}

/// A local stand-in for the upstream completions API.
#[cfg(test)]
pub(crate) mod mock_upstream {
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    #[derive(Clone)]
    pub enum MockReply {
        /// 200 with one choice carrying this content, plus an `echo`
        /// object holding the received Authorization header and body.
        Content(&'static str),
        /// 200 with an empty `choices` array.
        NoChoices,
        Error(u16, &'static str),
    }

    async fn handle(
        State(reply): State<MockReply>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let echo = json!({ "authorization": authorization, "body": body });

        match reply {
            MockReply::Content(content) => Json(json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "message": { "role": "assistant", "content": content },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 },
                "echo": echo,
            }))
            .into_response(),
            MockReply::NoChoices => Json(json!({ "id": "chatcmpl-empty", "choices": [], "echo": echo }))
                .into_response(),
            MockReply::Error(status, text) => {
                (StatusCode::from_u16(status).unwrap(), text).into_response()
            }
        }
    }

    /// Serve on an ephemeral port; returns the `/v1` base URL.
    pub async fn spawn(reply: MockReply) -> String {
        let app = Router::new()
            .route("/v1/chat/completions", post(handle))
            .with_state(reply);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    /// A base URL nothing is listening on.
    pub async fn closed_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/v1")
    }
}

#[cfg(test)]
mod tests {
    use super::mock_upstream::{self, MockReply};
    use super::*;
    use serde_json::json;

    fn client(base_url: &str, key: Option<&str>) -> RelayClient {
        RelayClient::new(base_url, key.map(String::from), 5).unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let req: RelayRequest =
            serde_json::from_value(json!({ "messages": [{ "role": "user", "content": "Привет" }] }))
                .unwrap();
        let out = ChatCompletionRequest::from(req);
        assert_eq!(out.model, "gemini-2.5-flash");
        assert_eq!(out.max_tokens, 2048);
        assert_eq!(out.temperature, 0.7);
        assert_eq!(out.messages[0]["content"], "Привет");
    }

    #[test]
    fn test_explicit_fields_are_kept() {
        let req: RelayRequest = serde_json::from_value(json!({
            "model": "gpt-4o-mini",
            "messages": [],
            "max_tokens": 100,
            "temperature": 0.0
        }))
        .unwrap();
        let out = ChatCompletionRequest::from(req);
        assert_eq!(out.model, "gpt-4o-mini");
        assert_eq!(out.max_tokens, 100);
        assert_eq!(out.temperature, 0.0);
    }

    #[test]
    fn test_empty_model_and_zero_tokens_use_defaults() {
        let req: RelayRequest =
            serde_json::from_value(json!({ "model": "", "max_tokens": 0 })).unwrap();
        let out = ChatCompletionRequest::from(req);
        assert_eq!(out.model, DEFAULT_MODEL);
        assert_eq!(out.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(out.temperature, DEFAULT_TEMPERATURE);
        // absent messages are omitted from the outbound body
        assert!(serde_json::to_value(&out).unwrap().get("messages").is_none());
    }

    #[test]
    fn test_numeric_fields_pass_through_untyped() {
        let req: RelayRequest = serde_json::from_value(json!({
            "max_tokens": 1024.0,
            "temperature": "0.3"
        }))
        .unwrap();
        let out = ChatCompletionRequest::from(req);
        assert_eq!(out.max_tokens, json!(1024.0));
        assert_eq!(out.temperature, json!("0.3"));

        let req: RelayRequest =
            serde_json::from_value(json!({ "max_tokens": null, "temperature": null })).unwrap();
        let out = ChatCompletionRequest::from(req);
        assert_eq!(out.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(out.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_upstream_error_message_format() {
        let err = RelayError::Upstream {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API Error: 429 - rate limited");
        assert_eq!(err.status_code(), 429);
        assert_eq!(RelayError::Transport("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_first_content() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Готово" } }]
        }))
        .unwrap();
        assert_eq!(resp.first_content(), Some("Готово"));
        assert_eq!(ChatCompletionResponse::default().first_content(), None);
    }

    #[tokio::test]
    async fn test_forward_sends_bearer_and_returns_upstream_json() {
        let url = mock_upstream::spawn(MockReply::Content("Ответ")).await;
        let relay = client(&url, Some("sk-test"));
        let req = ChatCompletionRequest::from(RelayRequest {
            messages: Some(json!([{ "role": "user", "content": "Сколько стоит чистка?" }])),
            ..Default::default()
        });

        let value = relay.forward(&req).await.unwrap();
        assert_eq!(value["id"], "chatcmpl-test");
        assert_eq!(value["echo"]["authorization"], "Bearer sk-test");
        assert_eq!(value["echo"]["body"]["model"], "gemini-2.5-flash");
        assert_eq!(value["echo"]["body"]["max_tokens"], 2048);
        assert_eq!(value["echo"]["body"]["temperature"], 0.7);
    }

    #[tokio::test]
    async fn test_forward_without_key_sends_no_authorization() {
        let url = mock_upstream::spawn(MockReply::Content("Ответ")).await;
        let value = client(&url, None)
            .forward(&ChatCompletionRequest::new(&[ChatMessage::user("Привет")], 10, 0.5))
            .await
            .unwrap();
        assert!(value["echo"]["authorization"].is_null());
    }

    #[tokio::test]
    async fn test_forward_maps_upstream_status() {
        let url = mock_upstream::spawn(MockReply::Error(429, "rate limited")).await;
        let err = client(&url, Some("k"))
            .forward(&ChatCompletionRequest::new(&[], 10, 0.5))
            .await
            .unwrap_err();
        match err {
            RelayError::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_forward_transport_failure() {
        let url = mock_upstream::closed_url().await;
        let err = client(&url, None)
            .forward(&ChatCompletionRequest::new(&[], 10, 0.5))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_complete_decodes_choices() {
        let url = mock_upstream::spawn(MockReply::Content("Запишитесь на чистку")).await;
        let resp = client(&url, None)
            .complete(&ChatCompletionRequest::new(&[ChatMessage::user("?")], 10, 0.5))
            .await
            .unwrap();
        assert_eq!(resp.first_content(), Some("Запишитесь на чистку"));
    }
}
