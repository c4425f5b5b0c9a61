use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;

pub mod gemini;
pub mod openai;
pub mod transport;

pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;
pub use transport::{build_http_client, HttpReply, HttpTransport, TransportError};

/// 模型后端抽象接口 (ModelBackend)
///
/// 每个外部服务一个实现，把纯文本 prompt 翻译成该服务的请求格式，
/// 再把响应解析回纯文本。
///
/// # 线程安全
/// 继承 `Send + Sync`，以 `Arc<dyn ModelBackend>` 的形式被 `ChatBotService` 持有并在请求间共享。
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// 执行一次补全请求
    ///
    /// # 参数 (Arguments)
    ///
    /// * `prompt` - 用户输入，空字符串也会原样发送。
    ///
    /// # 返回值 (Returns)
    ///
    /// * `Ok(Some(text))` - 模型回复，或者描述失败原因的文本。
    /// * `Ok(None)` - 响应成功但没有任何候选内容。
    /// * `Err(_)` - 内置的 Adapter 不会返回；留给调用方兜底处理。
    async fn complete(&self, prompt: &str) -> Result<Option<String>>;
}

/// Adapter 内部的失败分类，最终统一转换成带服务名的文本
#[derive(Debug)]
pub(crate) enum AdapterFailure {
    /// 网络层失败 (连接、超时、读取 body)
    Transport(TransportError),
    /// 非 2xx 响应；message 为错误信封里的消息或原始 body
    Status { status: StatusCode, message: String },
    /// 响应 JSON 无法解析
    Parse(serde_json::Error),
    /// 其他意外错误
    Unexpected(anyhow::Error),
}

impl AdapterFailure {
    /// 转换为给用户看的描述文本
    ///
    /// 这些文本都会被持久化闸门拒绝 (以 "Error" / "An error occurred" 开头，或包含 "provider error")。
    pub(crate) fn describe(&self, label: &str) -> String {
        match self {
            AdapterFailure::Transport(err) => format!("Error contacting {}: {}", label, err),
            AdapterFailure::Status { status, message } => {
                format!("{} provider error ({}): {}", label, status, message)
            }
            AdapterFailure::Parse(_) => format!("Error processing {} response.", label),
            AdapterFailure::Unexpected(err) => {
                format!("An error occurred in the {} service: {}", label, err)
            }
        }
    }
}

impl From<TransportError> for AdapterFailure {
    fn from(err: TransportError) -> Self {
        AdapterFailure::Transport(err)
    }
}

impl From<serde_json::Error> for AdapterFailure {
    fn from(err: serde_json::Error) -> Self {
        AdapterFailure::Parse(err)
    }
}

/// 错误信封解析成功但没有 message 时使用
pub(crate) const DETAILS_UNAVAILABLE: &str = "details not available";

/// 日志里只截取 prompt 的前 50 个字符
pub fn short_prompt(prompt: &str) -> String {
    let head: String = prompt.chars().take(50).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_prompt_truncates_on_chars() {
        let long = "ñ".repeat(80);
        let short = short_prompt(&long);
        assert_eq!(short.chars().count(), 53);
        assert!(short.ends_with("..."));
        assert_eq!(short_prompt(""), "...");
    }

    #[test]
    fn test_describe_formats() {
        let status = AdapterFailure::Status {
            status: StatusCode::UNAUTHORIZED,
            message: "bad key".to_string(),
        };
        assert_eq!(
            status.describe("OpenAI"),
            "OpenAI provider error (401 Unauthorized): bad key"
        );

        let parse = AdapterFailure::Parse(serde_json::from_str::<u8>("{").unwrap_err());
        assert_eq!(parse.describe("Gemini"), "Error processing Gemini response.");

        let other = AdapterFailure::Unexpected(anyhow::anyhow!("boom"));
        assert_eq!(
            other.describe("Gemini"),
            "An error occurred in the Gemini service: boom"
        );
    }
}
