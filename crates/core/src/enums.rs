// crates/core/src/enums.rs
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// 外部补全服务 (LLM Provider)
///
/// 固定集合：新增服务时同时新增一个变体和对应的 Adapter。
/// `Display` 的输出就是持久化到 `HistoryRecords.provider_name` 的文本形式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Provider {
    /// Google generative-content 接口
    #[serde(rename = "Gemini", alias = "gemini")]
    #[strum(serialize = "Gemini")]
    Gemini,

    /// OpenAI chat-completion 接口
    #[serde(rename = "OpenAI", alias = "openai")]
    #[strum(serialize = "OpenAI")]
    OpenAi,
}

impl Provider {
    /// 所有已接入的服务，用于启动日志与遍历测试
    pub const ALL: [Provider; 2] = [Provider::Gemini, Provider::OpenAi];
}
