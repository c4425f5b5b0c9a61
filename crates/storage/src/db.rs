use anyhow::{Context, Result};
use bot_core::HISTORY_TABLE;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// 初始化数据库连接池
///
/// # 参数
/// * `database_url`: 数据库连接字符串 (e.g., sqlite://bot_history.db)
///
/// 文件不存在时自动创建，并确保 `HistoryRecords` 表存在。
pub async fn init_db(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid SQLite connection string: {}", database_url))?
        .create_if_missing(true);

    // 1. 配置连接池参数
    let pool = SqlitePoolOptions::new()
        // SQLite 单文件写入是串行的，连接数不需要太多
        .max_connections(5)
        // 如果 3 秒拿不到连接，直接报错，不要死等
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(600))
        // 2. 建立连接
        .connect_with(options)
        .await
        .context("Failed to open SQLite database. Please check ConnectionStrings:DefaultConnection.")?;

    // 3. 验证连接是否真正可用
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to execute ping query")?;

    // 4. 建表
    ensure_schema(&pool).await?;

    info!("✅ History database ready at {}", database_url);
    Ok(pool)
}

/// 内存数据库 (测试使用)
///
/// 每个 `sqlite::memory:` 连接都是一个独立的库，所以连接池固定为 1 个且不回收。
pub async fn init_memory_db() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("Failed to open in-memory SQLite database")?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

/// 创建 `HistoryRecords` 表 (幂等)
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            text          TEXT NOT NULL CHECK (length(text) > 0),
            saved_at      TEXT NOT NULL,
            provider_name TEXT NOT NULL CHECK (length(provider_name) > 0),
            saved_by      TEXT NOT NULL CHECK (length(saved_by) > 0)
        )
        "#,
        table = HISTORY_TABLE
    );

    sqlx::query(&ddl)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create table {}", HISTORY_TABLE))?;

    Ok(())
}
