use anyhow::Result;
use bot_core::history::{HistoryRecord, NewHistoryRecord};
use sqlx::SqlitePool;

/// 历史记录仓储层
/// 只负责追加和读取，不提供更新 / 删除
#[derive(Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // 1. 写入
    // =========================================================================

    /// 追加一条历史记录，返回数据库分配的 ID
    ///
    /// 单条语句在自动提交模式下执行，返回时已经落盘。
    pub async fn insert(&self, record: &NewHistoryRecord) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO "HistoryRecords" (text, saved_at, provider_name, saved_by)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&record.text)
        .bind(record.saved_at)
        .bind(&record.provider_name)
        .bind(&record.saved_by)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    // =========================================================================
    // 2. 查询 (历史展示 / 审计)
    // =========================================================================

    pub async fn find_by_id(&self, id: i64) -> Result<Option<HistoryRecord>> {
        let record = sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT id, text, saved_at, provider_name, saved_by
            FROM "HistoryRecords"
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// 最近保存的记录，新的在前
    pub async fn find_recent(&self, limit: i64) -> Result<Vec<HistoryRecord>> {
        let records = sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT id, text, saved_at, provider_name, saved_by
            FROM "HistoryRecords"
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(1) FROM "HistoryRecords""#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
