use async_trait::async_trait;
use bot_chat::llm::{GeminiBackend, HttpReply, HttpTransport, ModelBackend, OpenAiBackend, TransportError};
use bot_chat::gate::is_storable;
use bot_core::error::BotError;
use bot_core::settings::{GEMINI_API_KEY, OPENAI_API_KEY};
use reqwest::header::{self, HeaderMap};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 记录下来的一次请求
#[derive(Debug, Clone)]
struct Captured {
    url: String,
    headers: HeaderMap,
    body: Value,
}

/// 模拟传输层 (Mock Transport)
/// 返回预设的响应，并记录收到的请求
struct MockTransport {
    reply: Result<(StatusCode, String), String>,
    calls: Mutex<Vec<Captured>>,
}

impl MockTransport {
    fn ok(status: StatusCode, body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok((status, body.into())),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(reason.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn last_call(&self) -> Captured {
        self.calls.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: HeaderMap,
        body: String,
    ) -> Result<HttpReply, TransportError> {
        self.calls.lock().unwrap().push(Captured {
            url: url.to_string(),
            headers,
            body: serde_json::from_str(&body).expect("adapter sent invalid JSON"),
        });
        match &self.reply {
            Ok((status, body)) => Ok(HttpReply {
                status: *status,
                body: body.clone(),
            }),
            Err(reason) => Err(TransportError::Request(reason.clone())),
        }
    }
}

fn secrets() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert(GEMINI_API_KEY.to_string(), "g-secret".to_string());
    map.insert(OPENAI_API_KEY.to_string(), "sk-secret".to_string());
    map
}

fn gemini(transport: Arc<MockTransport>) -> GeminiBackend {
    GeminiBackend::new(transport, &secrets()).expect("gemini backend")
}

fn openai(transport: Arc<MockTransport>) -> OpenAiBackend {
    OpenAiBackend::new(transport, &secrets()).expect("openai backend")
}

// =========================================================================
// 1. 构造：缺少密钥立即失败
// =========================================================================

#[test]
fn test_missing_secret_fails_at_construction() {
    let transport = MockTransport::ok(StatusCode::OK, "{}");
    let empty: HashMap<String, String> = HashMap::new();

    let err = GeminiBackend::new(transport.clone(), &empty).err().expect("should fail");
    assert!(matches!(err, BotError::ConfigError(ref m) if m.contains(GEMINI_API_KEY)));

    let err = OpenAiBackend::new(transport.clone(), &empty).err().expect("should fail");
    assert!(matches!(err, BotError::ConfigError(ref m) if m.contains(OPENAI_API_KEY)));

    let mut blank = HashMap::new();
    blank.insert(OPENAI_API_KEY.to_string(), "   ".to_string());
    assert!(OpenAiBackend::new(transport, &blank).is_err());
}

// =========================================================================
// 2. Gemini
// =========================================================================

#[tokio::test]
async fn test_gemini_request_and_success() {
    let transport = MockTransport::ok(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": {"parts": [{"text": "Hola desde Gemini"}], "role": "model"},
                "finishReason": "STOP",
                "index": 0
            }]
        })
        .to_string(),
    );
    let backend = gemini(transport.clone());

    let out = backend.complete("Hello").await.unwrap();
    assert_eq!(out.as_deref(), Some("Hola desde Gemini"));

    let call = transport.last_call();
    assert_eq!(
        call.url,
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-latest:generateContent?key=g-secret"
    );
    assert_eq!(call.body, json!({"contents": [{"parts": [{"text": "Hello"}]}]}));
    assert!(call.headers.get(header::AUTHORIZATION).is_none());
}

#[tokio::test]
async fn test_gemini_forwards_empty_prompt_and_custom_endpoint() {
    let transport = MockTransport::ok(StatusCode::OK, r#"{"candidates": []}"#);
    let backend = gemini(transport.clone())
        .with_endpoint("http://localhost:9000/v1beta/")
        .with_model("gemini-test");

    let out = backend.complete("").await.unwrap();
    assert!(out.is_none(), "Empty candidates should map to None");

    let call = transport.last_call();
    assert_eq!(
        call.url,
        "http://localhost:9000/v1beta/models/gemini-test:generateContent?key=g-secret"
    );
    assert_eq!(call.body["contents"][0]["parts"][0]["text"], "");
}

#[tokio::test]
async fn test_gemini_error_envelope() {
    let transport = MockTransport::ok(
        StatusCode::BAD_REQUEST,
        json!({"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}})
            .to_string(),
    );
    let out = gemini(transport).complete("Hello").await.unwrap().unwrap();

    assert_eq!(out, "Gemini provider error (400 Bad Request): API key not valid.");
    assert!(!is_storable(&out));
}

#[tokio::test]
async fn test_gemini_error_with_raw_body() {
    let transport = MockTransport::ok(StatusCode::BAD_GATEWAY, "upstream down");
    let out = gemini(transport).complete("Hello").await.unwrap().unwrap();

    assert_eq!(out, "Gemini provider error (502 Bad Gateway): upstream down");
}

#[tokio::test]
async fn test_gemini_transport_failure_is_text() {
    let transport = MockTransport::failing("connection refused");
    let out = gemini(transport).complete("Hello").await.unwrap().unwrap();

    assert_eq!(out, "Error contacting Gemini: request failed: connection refused");
    assert!(!out.contains("g-secret"));
    assert!(!is_storable(&out));
}

#[tokio::test]
async fn test_gemini_malformed_json_is_text() {
    let transport = MockTransport::ok(StatusCode::OK, "<html>not json</html>");
    let out = gemini(transport).complete("Hello").await.unwrap().unwrap();

    assert_eq!(out, "Error processing Gemini response.");
}

// =========================================================================
// 3. OpenAI
// =========================================================================

#[tokio::test]
async fn test_openai_request_and_success() {
    let transport = MockTransport::ok(
        StatusCode::OK,
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "\n Hello from OpenAI "},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 1, "completion_tokens": 3, "total_tokens": 4}
        })
        .to_string(),
    );
    let backend = openai(transport.clone());

    let out = backend.complete("Hello").await.unwrap();
    assert_eq!(out.as_deref(), Some("Hello from OpenAI"));

    let call = transport.last_call();
    assert_eq!(call.url, "https://api.openai.com/v1/chat/completions");
    assert_eq!(
        call.headers.get(header::AUTHORIZATION).unwrap().to_str().unwrap(),
        "Bearer sk-secret"
    );
    assert!(call.headers.get(header::AUTHORIZATION).unwrap().is_sensitive());
    assert_eq!(call.body["model"], "gpt-3.5-turbo");
    assert_eq!(call.body["messages"], json!([{"role": "user", "content": "Hello"}]));
    assert_eq!(call.body["max_tokens"], 1000);
    assert_eq!(call.body["temperature"], 0.7);
}

#[tokio::test]
async fn test_openai_no_choices_is_none() {
    let transport = MockTransport::ok(StatusCode::OK, r#"{"choices": []}"#);
    assert!(openai(transport).complete("Hello").await.unwrap().is_none());
}

#[tokio::test]
async fn test_openai_error_envelope() {
    let transport = MockTransport::ok(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "param": null, "code": "invalid_api_key"}})
            .to_string(),
    );
    let out = openai(transport).complete("Hello").await.unwrap().unwrap();

    assert_eq!(out, "OpenAI provider error (401 Unauthorized): Incorrect API key provided");
    assert!(!is_storable(&out));
}

#[tokio::test]
async fn test_openai_error_envelope_without_message() {
    let transport = MockTransport::ok(StatusCode::TOO_MANY_REQUESTS, r#"{"error": {"type": "rate_limit"}}"#);
    let out = openai(transport).complete("Hello").await.unwrap().unwrap();

    assert_eq!(out, "OpenAI provider error (429 Too Many Requests): details not available");
}

#[tokio::test]
async fn test_openai_transport_and_parse_failures() {
    let out = openai(MockTransport::failing("timed out"))
        .complete("Hello")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(out, "Error contacting OpenAI: request failed: timed out");

    let out = openai(MockTransport::ok(StatusCode::OK, r#"{"choices": "#))
        .complete("Hello")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(out, "Error processing OpenAI response.");
}
