use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

// 引入内部模块
use bot_chat::llm::build_http_client;
use bot_chat::ChatBotService;
use bot_core::enums::Provider;
use bot_core::settings::Settings;
use bot_storage::{db::init_db, Storage};

mod routes;

// =========================================================================
// 1. 日志配置 (输出到控制台 + 文件)
// =========================================================================
fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // 1. 文件输出器：每天生成一个新的日志文件 (logs/bot.2025-xx-xx.log)
    let file_appender = tracing_appender::rolling::daily("logs", "bot.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // 2. 控制台层 (Console Layer)
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .compact();

    // 3. 文件层 (File Layer)
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // 文件里不要颜色代码
        .with_file(true)
        .with_line_number(true);

    // 4. 注册全局订阅者
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard // 必须返回 guard，否则日志线程会立即销毁
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    warn!("🛑 Ctrl+C received! Shutting down gracefully...");
}

// =========================================================================
// 2. 主入口 (Main Entry)
// =========================================================================
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A. 加载配置与日志
    let _log_guard = init_logging(); // _guard 不能丢
    let settings = Settings::load().context("Failed to load configuration")?;

    info!("Starting bot web app ⚡️");

    // B. 初始化数据库连接
    let db_url = settings.database_url();
    info!("Opening history database at: {}", db_url);
    let pool = init_db(&db_url).await?;
    let storage = Storage::new(pool);

    // C. 组装服务 (缺少密钥在这里直接失败)
    let transport = Arc::new(build_http_client()?);
    let service = ChatBotService::from_settings(transport, &settings, Arc::new(storage.history()))
        .context("Failed to configure LLM providers")?;
    info!("📦 Providers ready: {:?}", Provider::ALL);

    // D. 启动 HTTP 服务
    let app = routes::router(routes::AppState {
        service: Arc::new(service),
    });
    let bind = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("🚀 Listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Bot web app shutdown complete.");
    Ok(())
}
