use super::HistoryStore;
use anyhow::Result;
use async_trait::async_trait;
use bot_core::history::NewHistoryRecord;
use bot_storage::HistoryRepository;

#[async_trait]
impl HistoryStore for HistoryRepository {
    async fn insert(&self, record: &NewHistoryRecord) -> Result<i64> {
        // 调用仓储层的同名方法 (非 trait 方法)
        HistoryRepository::insert(self, record).await
    }
}
