use crate::ensure_not_blank;
use crate::enums::Provider;
use crate::error::BotError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 对应数据库表名
pub const HISTORY_TABLE: &str = "HistoryRecords";

/// 历史记录实体 (History Record)
///
/// 对应数据库表: `HistoryRecords`
///
/// 每一行代表一次被接受的模型回复。核心代码只追加，不修改也不删除。
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryRecord {
    /// 数据库物理主键 (自增 ID)
    /// 类型: INTEGER
    #[sqlx(rename = "id")]
    pub id: i64,

    /// 回复正文，不能为空
    pub text: String,

    /// 保存时间 (UTC)
    pub saved_at: DateTime<Utc>,

    /// Provider 的文本形式
    /// 示例: "Gemini", "OpenAI"
    pub provider_name: String,

    /// 请求保存的操作者
    pub saved_by: String,
}

/// 待插入的历史记录 (还没有数据库 ID)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    pub text: String,
    pub saved_at: DateTime<Utc>,
    pub provider_name: String,
    pub saved_by: String,
}

impl NewHistoryRecord {
    /// 创建一条新记录，`saved_at` 取当前 UTC 时间
    ///
    /// 三个必填字符串字段任一为空白都会返回 `MissingField`。
    pub fn new(text: &str, provider: Provider, saved_by: &str) -> Result<Self, BotError> {
        ensure_not_blank!(text, "text");
        ensure_not_blank!(saved_by, "saved_by");

        let provider_name = provider.to_string();
        ensure_not_blank!(provider_name, "provider_name");

        Ok(Self {
            text: text.to_string(),
            saved_at: Utc::now(),
            provider_name,
            saved_by: saved_by.to_string(),
        })
    }
}
