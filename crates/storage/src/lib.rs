use sqlx::SqlitePool;

// 声明子模块
pub mod db;
pub mod repository;

pub use repository::history_repo::HistoryRepository;

/// 存储层容器，持有共享连接池
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn history(&self) -> HistoryRepository {
        HistoryRepository::new(self.pool.clone())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
