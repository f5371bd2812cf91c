//! Upstream provider configuration entities

use serde::{Deserialize, Serialize};

/// Provider type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Openai,
    Anthropic,
    Gemini,
    Other,
}

impl Default for ProviderType {
    fn default() -> Self {
        Self::Other
    }
}

/// A model advertised by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderModel {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

/// An upstream LLM provider as configured in the settings store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    #[serde(rename = "type", default)]
    pub provider_type: ProviderType,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_host: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub models: Vec<ProviderModel>,
}

impl Provider {
    /// Whether this provider exposes an OpenAI-compatible call surface.
    ///
    /// OpenAI-typed providers always qualify. Ollama installs qualify by
    /// host or id even when typed differently, since they speak the same
    /// protocol on their default port.
    pub fn is_openai_compatible(&self) -> bool {
        if self.provider_type == ProviderType::Openai {
            return true;
        }

        self.api_host.contains("localhost:11434")
            || self.api_host.contains("127.0.0.1:11434")
            || self.id.to_lowercase().contains("ollama")
    }

    /// Whether this provider is eligible to serve requests
    pub fn is_eligible(&self) -> bool {
        self.enabled && self.is_openai_compatible()
    }

    pub fn has_model(&self, model_id: &str) -> bool {
        self.models.iter().any(|m| m.id == model_id)
    }

    /// Model ids, for diagnostics
    pub fn model_ids(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.id.as_str()).collect()
    }
}
