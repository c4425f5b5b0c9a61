use crate::llm::transport::HttpTransport;
use crate::llm::{short_prompt, AdapterFailure, ModelBackend, DETAILS_UNAVAILABLE};
use anyhow::Result;
use async_trait::async_trait;
use bot_core::error::BotError;
use bot_core::settings::{SecretSource, GEMINI_API_KEY};
use bot_core::ensure_some;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info};

const LABEL: &str = "Gemini";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash-latest";

// ==========================================
// 1. 响应结构体
// ==========================================

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    // 对应 JSON 中的 "candidates"
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    // 对应 JSON 中的 "finishReason" (仅用于调试)
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// 错误信封: {"error": {"code": 400, "message": "...", "status": "INVALID_ARGUMENT"}}
#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetails>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetails {
    message: Option<String>,
    status: Option<String>,
}

impl GeminiResponse {
    /// 路径: candidates[0] -> content -> parts[0] -> text
    fn first_text(self) -> Option<String> {
        let candidate = self.candidates?.into_iter().next()?;
        if let Some(reason) = &candidate.finish_reason {
            debug!("Gemini finish reason: {}", reason);
        }
        candidate.content?.parts?.into_iter().next()?.text
    }
}

// ==========================================
// 2. 实现 Gemini Backend
// ==========================================

/// Google generative-content 接口
///
/// 鉴权方式：API Key 放在 URL query 参数 `key` 中。
pub struct GeminiBackend {
    transport: Arc<dyn HttpTransport>,
    api_key: String,
    endpoint: String,
    model: String,
}

impl GeminiBackend {
    /// 创建实例，密钥在这里立即解析，缺失直接失败
    pub fn new(transport: Arc<dyn HttpTransport>, secrets: &dyn SecretSource) -> Result<Self, BotError> {
        let api_key = ensure_some!(
            secrets.resolve(GEMINI_API_KEY),
            "API key for Gemini not found in configuration ({})",
            GEMINI_API_KEY
        );

        Ok(Self {
            transport,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// 替换 API 根地址 (代理或测试)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// 不带密钥的 URL，用于日志
    fn base_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    async fn call(&self, prompt: &str) -> Result<Option<String>, AdapterFailure> {
        // 1. 构建请求 Body
        let request_body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });
        let payload = serde_json::to_string(&request_body)
            .map_err(|e| AdapterFailure::Unexpected(e.into()))?;

        // 2. 发送请求 (密钥走 query 参数)
        let url = format!("{}?key={}", self.base_url(), self.api_key);
        info!("Sending request to Gemini model: {}, prompt: {}", self.model, short_prompt(prompt));
        let reply = self
            .transport
            .post_json(&url, HeaderMap::new(), payload)
            .await?;

        // 3. 检查 HTTP 状态码
        if !reply.status.is_success() {
            error!(
                "Gemini request failed. Status: {}, Body: {}",
                reply.status, reply.body
            );
            let message = match serde_json::from_str::<GeminiErrorResponse>(&reply.body) {
                Ok(envelope) => envelope
                    .error
                    .and_then(|e| {
                        if let Some(status) = &e.status {
                            debug!("Gemini error status: {}", status);
                        }
                        e.message
                    })
                    .unwrap_or_else(|| DETAILS_UNAVAILABLE.to_string()),
                Err(_) => reply.body,
            };
            return Err(AdapterFailure::Status {
                status: reply.status,
                message,
            });
        }

        // 4. 解析 JSON 响应并提取文本
        let response_data: GeminiResponse = serde_json::from_str(&reply.body)?;
        info!("Response received from Gemini");
        Ok(response_data.first_text())
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn complete(&self, prompt: &str) -> Result<Option<String>> {
        match self.call(prompt).await {
            Ok(text) => Ok(text),
            Err(failure) => {
                error!("Gemini call failed ({}): {:?}", self.base_url(), failure);
                Ok(Some(failure.describe(LABEL)))
            }
        }
    }
}

// ==========================================
// 3. 单元测试
// ==========================================
