use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// 一次 HTTP 调用的原始结果
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

/// 网络层错误 (没有拿到完整的 HTTP 响应)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// HTTP 传输接口
///
/// Adapter 只通过它发请求，生产环境用共享的 `reqwest::Client`，测试里换成内存实现。
/// 连接复用和超时都由具体实现负责。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST 一个 JSON body，`Content-Type: application/json` 由实现补上
    async fn post_json(
        &self,
        url: &str,
        headers: HeaderMap,
        body: String,
    ) -> Result<HttpReply, TransportError>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn post_json(
        &self,
        url: &str,
        headers: HeaderMap,
        body: String,
    ) -> Result<HttpReply, TransportError> {
        let res = self
            .post(url)
            .headers(headers)
            .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            // 去掉 URL，Gemini 的密钥在 query 参数里
            .map_err(|e| TransportError::Request(e.without_url().to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| TransportError::Body(e.without_url().to_string()))?;

        Ok(HttpReply { status, body })
    }
}

/// 构建共享的 HTTP 客户端 (60 秒超时)
pub fn build_http_client() -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()?;
    Ok(client)
}
