//! Knowledge Gateway
//!
//! An OpenAI-compatible chat completion gateway that augments
//! conversations with knowledge base retrieval before relaying them to
//! upstream providers. Callers address models as `provider:model` and may
//! attach knowledge base descriptors to a request; retrieved passages are
//! injected as context and returned as citations.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{KnowledgeSearcher, ProviderResolver};
use infrastructure::llm::{HttpClient, OpenAiUpstreamClient};
use infrastructure::retrieval::HttpRetrievalService;
use infrastructure::settings::SettingsStore;

/// Wire up the application state from configuration
pub fn create_app_state(config: &AppConfig) -> AppState {
    let settings = Arc::new(SettingsStore::from_config(config));
    let resolver = ProviderResolver::new(settings.clone());

    let http_client = Arc::new(HttpClient::new());
    let retrieval = Arc::new(HttpRetrievalService::new(
        http_client.clone(),
        config.retrieval.base_url.clone(),
    ));
    let searcher = Arc::new(KnowledgeSearcher::new(resolver.clone(), retrieval));
    let upstream = Arc::new(OpenAiUpstreamClient::new(http_client));

    AppState::new(settings, resolver, searcher, upstream)
}
