pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use bot_core::history::NewHistoryRecord;

/// 历史记录存储接口
///
/// 核心代码只追加记录。任何实现该接口的结构体 (SQLite 仓储、测试里的内存实现)
/// 都可以被注入到 `ChatBotService` 中。
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 插入并提交一条记录
    ///
    /// # 返回
    /// * `Ok(id)` - 存储分配的 ID
    /// * `Err(e)` - 存储不可用或违反约束
    async fn insert(&self, record: &NewHistoryRecord) -> Result<i64>;
}
