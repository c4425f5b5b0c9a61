use crate::llm::transport::HttpTransport;
use crate::llm::{short_prompt, AdapterFailure, ModelBackend, DETAILS_UNAVAILABLE};
use anyhow::Result;
use async_trait::async_trait;
use bot_core::ensure_some;
use bot_core::error::BotError;
use bot_core::settings::{SecretSource, OPENAI_API_KEY};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

const LABEL: &str = "OpenAI";
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1000;

// ==========================================
// 1. 请求 / 响应结构体 (OpenAI 格式)
// ==========================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    // 对应 JSON 中的 "choices"
    choices: Option<Vec<OpenAiChoice>>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

/// 错误信封: {"error": {"message": "...", "type": "...", "param": null, "code": "..."}}
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: Option<OpenAiErrorDetails>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetails {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}

impl OpenAiResponse {
    /// 路径: choices[0] -> message -> content (去掉首尾空白)
    fn first_text(self) -> Option<String> {
        if let Some(model) = &self.model {
            debug!("OpenAI answered with model: {}", model);
        }
        let choice = self.choices?.into_iter().next()?;
        if let Some(reason) = &choice.finish_reason {
            debug!("OpenAI finish reason: {}", reason);
        }
        choice.message?.content.map(|c| c.trim().to_string())
    }
}

// ==========================================
// 2. 实现 OpenAI Backend
// ==========================================

/// OpenAI chat-completion 接口
///
/// 鉴权方式：`Authorization: Bearer <key>`。
pub struct OpenAiBackend {
    transport: Arc<dyn HttpTransport>,
    headers: HeaderMap,
    endpoint: String,
    model: String,
}

impl OpenAiBackend {
    /// 创建实例，密钥在这里立即解析，缺失直接失败
    pub fn new(transport: Arc<dyn HttpTransport>, secrets: &dyn SecretSource) -> Result<Self, BotError> {
        let api_key = ensure_some!(
            secrets.resolve(OPENAI_API_KEY),
            "API key for OpenAI not found in configuration ({})",
            OPENAI_API_KEY
        );

        let mut auth_header_val = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| BotError::ConfigError("Invalid characters in OpenAI API key".to_string()))?;
        // 标记为敏感信息，日志中不打印
        auth_header_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth_header_val);

        Ok(Self {
            transport,
            headers,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// 替换完整的 chat-completions 地址 (代理或测试)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn call(&self, prompt: &str) -> Result<Option<String>, AdapterFailure> {
        // 1. 构建请求 Body
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let payload =
            serde_json::to_string(&request).map_err(|e| AdapterFailure::Unexpected(e.into()))?;

        // 2. 发送请求
        info!("Sending request to OpenAI. Model: {}, prompt: {}", self.model, short_prompt(prompt));
        let reply = self
            .transport
            .post_json(&self.endpoint, self.headers.clone(), payload)
            .await?;

        // 3. 检查 HTTP 状态码
        if !reply.status.is_success() {
            error!(
                "OpenAI request failed. Status: {}, Body: {}",
                reply.status, reply.body
            );
            let message = match serde_json::from_str::<OpenAiErrorResponse>(&reply.body) {
                Ok(envelope) => envelope
                    .error
                    .and_then(|e| {
                        debug!("OpenAI error type: {:?}, code: {:?}", e.kind, e.code);
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
        let response_data: OpenAiResponse = serde_json::from_str(&reply.body)?;
        info!("Response received from OpenAI");
        Ok(response_data.first_text())
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<Option<String>> {
        match self.call(prompt).await {
            Ok(text) => Ok(text),
            Err(failure) => {
                error!("OpenAI call failed ({}): {:?}", self.endpoint, failure);
                Ok(Some(failure.describe(LABEL)))
            }
        }
    }
}

// ==========================================
// 3. 单元测试
// ==========================================
