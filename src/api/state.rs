//! Application state for shared services

use std::sync::Arc;

use crate::domain::{KnowledgeSearcher, ProviderResolver};
use crate::infrastructure::llm::UpstreamClient;
use crate::infrastructure::settings::SettingsStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<SettingsStore>,
    pub resolver: ProviderResolver,
    pub searcher: Arc<KnowledgeSearcher>,
    pub upstream: Arc<dyn UpstreamClient>,
}

impl AppState {
    pub fn new(
        settings: Arc<SettingsStore>,
        resolver: ProviderResolver,
        searcher: Arc<KnowledgeSearcher>,
        upstream: Arc<dyn UpstreamClient>,
    ) -> Self {
        Self {
            settings,
            resolver,
            searcher,
            upstream,
        }
    }
}
