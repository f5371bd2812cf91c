//! OpenAI-compatible v1 API endpoints

pub mod chat;
pub mod knowledge;
pub mod models;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/chat/completions", post(chat::create_chat_completion))
        .route("/models", get(models::list_models))
        .route("/models/{model_id}", get(models::get_model))
        .route("/knowledge", get(knowledge::list_knowledge_bases))
        .route("/knowledge/{base_id}", get(knowledge::get_knowledge_base))
}
