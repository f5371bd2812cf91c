//! Read-mostly gateway settings: the server credential, the provider set
//! and the configured knowledge base catalog. Components take a snapshot
//! per request; `reload` swaps the whole state in one write.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::error::DomainError;
use crate::domain::knowledge::KnowledgeBaseDescriptor;
use crate::domain::provider::{Provider, ProviderSource};

/// The reloadable slice of configuration
#[derive(Debug, Clone, Default)]
pub struct GatewaySettings {
    /// Secret callers must present; absent means every request is refused
    pub api_key: Option<String>,
    pub providers: Vec<Provider>,
    pub knowledge_bases: Vec<KnowledgeBaseDescriptor>,
}

impl GatewaySettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.auth.api_key.clone(),
            providers: config.providers.clone(),
            knowledge_bases: config.knowledge_bases.clone(),
        }
    }
}

/// Shared settings store with an explicit reload capability
#[derive(Debug)]
pub struct SettingsStore {
    inner: RwLock<GatewaySettings>,
}

impl SettingsStore {
    pub fn new(settings: GatewaySettings) -> Self {
        if settings.api_key.is_none() {
            warn!("No API key configured; all requests will be refused");
        }
        Self {
            inner: RwLock::new(settings),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(GatewaySettings::from_config(config))
    }

    pub async fn snapshot(&self) -> GatewaySettings {
        self.inner.read().await.clone()
    }

    pub async fn api_key(&self) -> Option<String> {
        self.inner.read().await.api_key.clone()
    }

    pub async fn knowledge_bases(&self) -> Vec<KnowledgeBaseDescriptor> {
        self.inner.read().await.knowledge_bases.clone()
    }

    pub async fn provider_count(&self) -> usize {
        self.inner.read().await.providers.len()
    }

    /// Re-read the configuration sources and swap the settings
    pub async fn reload(&self) -> Result<(), DomainError> {
        let config = AppConfig::load()
            .map_err(|e| DomainError::configuration(format!("Failed to reload settings: {}", e)))?;

        let settings = GatewaySettings::from_config(&config);
        info!(
            provider_count = settings.providers.len(),
            knowledge_base_count = settings.knowledge_bases.len(),
            "Settings reloaded"
        );
        *self.inner.write().await = settings;
        Ok(())
    }

    /// Replace the settings wholesale (used by tests and embedders)
    pub async fn replace(&self, settings: GatewaySettings) {
        *self.inner.write().await = settings;
    }
}

#[async_trait]
impl ProviderSource for SettingsStore {
    async fn eligible_providers(&self) -> Vec<Provider> {
        self.inner
            .read()
            .await
            .providers
            .iter()
            .filter(|p| p.is_eligible())
            .cloned()
            .collect()
    }
}
