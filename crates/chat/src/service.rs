use crate::gate;
use crate::llm::transport::HttpTransport;
use crate::llm::{short_prompt, GeminiBackend, ModelBackend, OpenAiBackend};
use crate::store::HistoryStore;
use bot_core::completion::CompletionResult;
use bot_core::enums::Provider;
use bot_core::error::BotError;
use bot_core::settings::SecretSource;
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Adapter 返回空内容时的替代文本
pub const NO_RESPONSE: &str = "No response could be obtained from the provider.";

/// Adapter 自身失败 (返回 Err 或 panic) 时的替代文本
pub fn contact_failure(provider: Provider) -> String {
    format!(
        "An error occurred contacting provider {}. Please try again later.",
        provider
    )
}

/// **ChatBotService**：对外唯一的入口。
///
/// 核心职责：
/// 1. 按 `Provider` 选择 Adapter 并计时、记录日志。
/// 2. 把所有结果 (成功、空内容、内部失败) 统一包装成 `CompletionResult`。
/// 3. 把保存请求转交给持久化闸门。
///
/// 两个方法都不会向调用方返回错误。
pub struct ChatBotService {
    gemini: Arc<dyn ModelBackend>,
    openai: Arc<dyn ModelBackend>,
    store: Arc<dyn HistoryStore>,
}

impl ChatBotService {
    pub fn new(
        gemini: Arc<dyn ModelBackend>,
        openai: Arc<dyn ModelBackend>,
        store: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            gemini,
            openai,
            store,
        }
    }

    /// 用真实的 Adapter 组装服务
    ///
    /// 任一密钥缺失都会在这里直接失败。
    pub fn from_settings(
        transport: Arc<dyn HttpTransport>,
        secrets: &dyn SecretSource,
        store: Arc<dyn HistoryStore>,
    ) -> Result<Self, BotError> {
        let gemini = GeminiBackend::new(transport.clone(), secrets)?;
        let openai = OpenAiBackend::new(transport, secrets)?;
        Ok(Self::new(Arc::new(gemini), Arc::new(openai), store))
    }

    /// Provider -> Adapter 的固定映射
    ///
    /// 新增 Provider 变体而忘了接线会在这里编译失败。
    fn backend(&self, provider: Provider) -> &Arc<dyn ModelBackend> {
        match provider {
            Provider::Gemini => &self.gemini,
            Provider::OpenAi => &self.openai,
        }
    }

    /// 向指定服务请求一次补全
    pub async fn get_response(&self, prompt: &str, provider: Provider) -> CompletionResult {
        // 时间戳在发起网络请求之前记录
        let timestamp = Utc::now();
        let started = Instant::now();

        info!(
            "Requesting response from provider {} with prompt: {}",
            provider,
            short_prompt(prompt)
        );

        let backend = self.backend(provider);
        let outcome = AssertUnwindSafe(backend.complete(prompt))
            .catch_unwind()
            .await;
        let elapsed_ms = started.elapsed().as_millis();

        let content = match outcome {
            Ok(Ok(Some(text))) => {
                info!("Response received from {} in {} ms", provider, elapsed_ms);
                text
            }
            Ok(Ok(None)) => {
                warn!("Provider {} returned no content after {} ms", provider, elapsed_ms);
                NO_RESPONSE.to_string()
            }
            Ok(Err(e)) => {
                error!(
                    "Error obtaining response from provider {} after {} ms: {:?}",
                    provider, elapsed_ms, e
                );
                contact_failure(provider)
            }
            Err(_) => {
                error!("Adapter for provider {} panicked after {} ms", provider, elapsed_ms);
                contact_failure(provider)
            }
        };

        CompletionResult::new(content, timestamp, provider)
    }

    /// 请求保存一条回复 (是否真正保存由闸门决定)
    pub async fn store_response(&self, content: &str, provider: Provider, saved_by: &str) {
        gate::maybe_store(self.store.as_ref(), content, provider, saved_by).await;
    }
}
