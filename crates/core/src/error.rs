use thiserror::Error;

/// 统一的错误定义
/// 使用 `thiserror` 宏自动生成 Display 和 Error trait
///
/// 注意：Provider 调用失败和持久化失败不会以错误形式返回给调用方，
/// 它们在 Adapter / 持久化闸门内部被转换成文本或被记录后吞掉。
#[derive(Error, Debug)]
pub enum BotError {
    // =================================================================
    // 1. 系统与配置类 (System & Config)
    // =================================================================
    /// 启动时缺少密钥或连接串，属于致命错误
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =================================================================
    // 2. 数据校验类 (Validation)
    // =================================================================
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// 只会出现在字符串解析边界 (例如 HTTP 请求里的 provider 名称)
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    // =================================================================
    // 3. 基础设施类 (Infrastructure)
    // =================================================================
    #[error("Database storage error: {0}")]
    StorageError(#[from] sqlx::Error),
}

impl From<config::ConfigError> for BotError {
    fn from(err: config::ConfigError) -> Self {
        BotError::ConfigError(err.to_string())
    }
}
