use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use bot_chat::ChatBotService;
use bot_core::completion::CompletionResult;
use bot_core::enums::Provider;
use bot_core::error::BotError;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatBotService>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    prompt: String,
    provider: String,
}

#[derive(Debug, Deserialize)]
struct StoreRequest {
    content: String,
    provider: String,
    saved_by: String,
}

type ApiError = (StatusCode, String);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/history", post(store))
        .with_state(state)
}

/// POST /api/chat -> CompletionResult
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<CompletionResult>, ApiError> {
    let provider = parse_provider(&req.provider)?;
    let result = state.service.get_response(&req.prompt, provider).await;
    Ok(Json(result))
}

/// POST /api/history -> 204，无论是否真正保存
async fn store(
    State(state): State<AppState>,
    Json(req): Json<StoreRequest>,
) -> Result<StatusCode, ApiError> {
    let provider = parse_provider(&req.provider)?;
    state
        .service
        .store_response(&req.content, provider, &req.saved_by)
        .await;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_provider(name: &str) -> Result<Provider, ApiError> {
    Provider::from_str(name.trim()).map_err(|_| {
        let err = BotError::UnsupportedProvider(name.to_string());
        warn!("Rejected request: {}", err);
        (StatusCode::BAD_REQUEST, err.to_string())
    })
}
