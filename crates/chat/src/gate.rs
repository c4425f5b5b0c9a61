//! 持久化闸门：只根据文本内容决定一条回复能否入库。

use crate::store::HistoryStore;
use bot_core::enums::Provider;
use bot_core::history::NewHistoryRecord;
use tracing::{error, info, warn};

// 最后一项是旧版界面的西班牙语失败模板，历史数据里仍会出现
const REJECTED_PREFIXES: [&str; 3] = ["error", "an error occurred", "se produjo un error"];
const REJECTED_MARKER: &str = "provider error";

/// 判断内容是否可以保存
///
/// 去掉首尾空白后非空，且不以 "Error" / "An error occurred" / "Se produjo un error" 开头，
/// 且不包含 "provider error"。比较都忽略大小写。
pub fn is_storable(content: &str) -> bool {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return false;
    }

    let lowered = trimmed.to_lowercase();
    if REJECTED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return false;
    }

    !lowered.contains(REJECTED_MARKER)
}

/// 满足条件时写入一条历史记录
///
/// 不合格的内容只打 warning；写库失败只打 error。调用方拿不到任何成功/失败信号。
pub async fn maybe_store(store: &dyn HistoryStore, content: &str, provider: Provider, saved_by: &str) {
    if !is_storable(content) {
        warn!(
            "Refusing to store empty or error-shaped response. Content: {}",
            content
        );
        return;
    }

    let record = match NewHistoryRecord::new(content, provider, saved_by) {
        Ok(record) => record,
        Err(e) => {
            error!("Failed to build history record: {}", e);
            return;
        }
    };

    match store.insert(&record).await {
        Ok(id) => info!(
            "Response from {} stored by {}. ID: {}",
            provider, saved_by, id
        ),
        Err(e) => error!("Failed to store response in the database: {:?}", e),
    }
}
