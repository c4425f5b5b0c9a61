use crate::enums::Provider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一次补全请求的结果信封 (Envelope)
///
/// 每次调用 `get_response` 产生一个，构造后不再修改。
/// 它本身从不入库，只有 `content` 会被拷贝进 `HistoryRecord`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// 模型输出或描述性的失败文本
    pub content: Option<String>,

    /// 调用入口处记录的时间 (发起网络请求之前)
    pub timestamp: DateTime<Utc>,

    pub provider: Provider,
}

impl CompletionResult {
    pub fn new(content: impl Into<String>, timestamp: DateTime<Utc>, provider: Provider) -> Self {
        Self {
            content: Some(content.into()),
            timestamp,
            provider,
        }
    }

    /// 便捷读取，信封由 Dispatch 产生时 content 总是存在
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}
