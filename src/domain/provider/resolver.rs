//! Provider/model resolution for compound `provider:model` identifiers

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::entity::Provider;
use crate::domain::error::DomainError;

/// Source of the current provider configuration.
///
/// Re-read on every resolution so settings reloads take effect without
/// restarting in-flight state.
#[async_trait]
pub trait ProviderSource: Send + Sync + std::fmt::Debug {
    /// Providers that are enabled and OpenAI-compatible
    async fn eligible_providers(&self) -> Vec<Provider>;
}

/// A successfully resolved chat model
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    pub provider: Provider,
    /// Bare model id with the provider prefix stripped
    pub model_id: String,
}

/// Split a compound `provider:model` identifier.
///
/// The model portion may itself contain `:` and is rejoined, so only the
/// first separator is structural.
pub fn split_model_id(model: &str) -> Result<(&str, &str), DomainError> {
    if model.is_empty() {
        return Err(DomainError::invalid_model_format(
            "Model must be a non-empty string",
        ));
    }

    let Some((provider_id, model_id)) = model.split_once(':') else {
        return Err(DomainError::invalid_model_format(format!(
            "Invalid model format. Expected 'provider:model_id' (e.g. 'my-openai:gpt-4'), got: '{}'",
            model
        )));
    };

    if provider_id.is_empty() || model_id.is_empty() {
        return Err(DomainError::invalid_model_format(format!(
            "Invalid model format. Both provider and model_id must be non-empty, got: '{}'",
            model
        )));
    }

    Ok((provider_id, model_id))
}

/// Resolves compound model identifiers against the current provider set
#[derive(Debug, Clone)]
pub struct ProviderResolver {
    providers: Arc<dyn ProviderSource>,
}

impl ProviderResolver {
    pub fn new(providers: Arc<dyn ProviderSource>) -> Self {
        Self { providers }
    }

    /// Resolve the provider half of a compound id without checking the
    /// model list. Used for embedding and rerank model references, where
    /// the provider's advertised chat models are not authoritative.
    pub async fn resolve_provider(&self, model: &str) -> Result<ResolvedModel, DomainError> {
        let (provider_id, model_id) = split_model_id(model)?;

        let providers = self.providers.eligible_providers().await;
        let provider = providers
            .iter()
            .find(|p| p.id == provider_id)
            .cloned()
            .ok_or_else(|| {
                let available: Vec<&str> = providers.iter().map(|p| p.id.as_str()).collect();
                warn!(
                    provider_id = %provider_id,
                    available = ?available,
                    "Provider not found or not enabled"
                );
                DomainError::provider_not_found(format!(
                    "Provider '{}' not found, not enabled, or not OpenAI-compatible",
                    provider_id
                ))
            })?;

        Ok(ResolvedModel {
            provider,
            model_id: model_id.to_string(),
        })
    }

    /// Resolve a chat model: provider lookup plus confirmation that the
    /// bare model id is listed among the provider's known models.
    pub async fn resolve_chat_model(&self, model: &str) -> Result<ResolvedModel, DomainError> {
        let resolved = self.resolve_provider(model).await?;

        if !resolved.provider.has_model(&resolved.model_id) {
            let available = resolved.provider.model_ids().join(", ");
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available
            };
            return Err(DomainError::model_not_available(format!(
                "Model '{}' not available in provider '{}'. Available models: {}",
                resolved.model_id, resolved.provider.id, available
            )));
        }

        debug!(
            provider_id = %resolved.provider.id,
            model_id = %resolved.model_id,
            "Resolved chat model"
        );

        Ok(resolved)
    }
}
