use crate::error::BotError;
use config::{Config, Environment, File};
use dotenvy::dotenv;
use std::collections::HashMap;

/// Gemini 的密钥名
pub const GEMINI_API_KEY: &str = "ApiKeys:Gemini";
/// OpenAI 的密钥名
pub const OPENAI_API_KEY: &str = "ApiKeys:OpenAI";
/// 历史记录数据库连接串
pub const DATABASE_URL_KEY: &str = "ConnectionStrings:DefaultConnection";
/// HTTP 监听地址
pub const SERVER_BIND_KEY: &str = "Server:Bind";

const DEFAULT_DATABASE_URL: &str = "sqlite://bot_history.db";
const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// 密钥解析接口
///
/// Adapter 只依赖这一个能力：按名字取一个字符串值。
/// 名字使用 `Section:Key` 形式，例如 `ApiKeys:Gemini`。
pub trait SecretSource: Send + Sync {
    fn resolve(&self, key: &str) -> Option<String>;
}

impl SecretSource for HashMap<String, String> {
    fn resolve(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// --- 应用配置 ---
/// 分层加载：默认值 -> `appsettings.toml` (可选) -> 环境变量 `BOT__SECTION__KEY`
#[derive(Debug, Clone)]
pub struct Settings {
    inner: Config,
}

impl Settings {
    /// 从文件和环境变量加载配置 (同时读取 .env)
    pub fn load() -> Result<Self, BotError> {
        dotenv().ok();

        let inner = Config::builder()
            .set_default(to_path(DATABASE_URL_KEY), DEFAULT_DATABASE_URL)?
            .set_default(to_path(SERVER_BIND_KEY), DEFAULT_BIND)?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(Environment::with_prefix("BOT").separator("__"))
            .build()?;

        Ok(Self { inner })
    }

    /// 用已经构建好的 `Config` 包装 (测试或嵌入场景)
    pub fn from_config(inner: Config) -> Self {
        Self { inner }
    }

    /// 按 `Section:Key` 读取字符串
    ///
    /// 环境变量来源的键会被转成小写，所以原样查不到时再按小写查一次。
    pub fn get(&self, key: &str) -> Option<String> {
        let path = to_path(key);
        self.inner
            .get_string(&path)
            .or_else(|_| self.inner.get_string(&path.to_lowercase()))
            .ok()
    }

    pub fn database_url(&self) -> String {
        self.get(DATABASE_URL_KEY)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }

    pub fn bind_addr(&self) -> String {
        self.get(SERVER_BIND_KEY)
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }
}

impl SecretSource for Settings {
    fn resolve(&self, key: &str) -> Option<String> {
        self.get(key)
    }
}

/// `ApiKeys:Gemini` -> `ApiKeys.Gemini`
fn to_path(key: &str) -> String {
    key.replace(':', ".")
}
