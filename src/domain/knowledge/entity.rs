//! Knowledge base descriptors and search result entities

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Reference to a model as supplied in a knowledge base descriptor.
///
/// The `provider` field may be absent, in which case the id itself is
/// expected to carry the `provider:model` compound form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl ModelRef {
    /// The compound `provider:model` identifier for this reference.
    ///
    /// Falls back to the raw id when no provider field is present; the id
    /// must then contain the separator itself.
    pub fn compound_id(&self) -> Result<String, DomainError> {
        match &self.provider {
            Some(provider) if !provider.is_empty() => Ok(format!("{}:{}", provider, self.id)),
            _ if self.id.contains(':') => Ok(self.id.clone()),
            _ => Err(DomainError::invalid_model_format(format!(
                "Model reference '{}' has no provider and no 'provider:model' form",
                self.id
            ))),
        }
    }
}

/// Stored file record attached to a knowledge base item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
}

/// An item inside a knowledge base descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<FileContent>,
}

impl KnowledgeItem {
    /// File items carry the content record used for filename recovery
    pub fn file_content(&self) -> Option<&FileContent> {
        if self.item_type == "file" {
            self.content.as_ref()
        } else {
            None
        }
    }
}

/// Caller-supplied, per-request knowledge base descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRef>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "rerankModel")]
    pub rerank_model: Option<ModelRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "chunkSize")]
    pub chunk_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "chunkOverlap")]
    pub chunk_overlap: Option<u32>,
    #[serde(default)]
    pub items: Vec<KnowledgeItem>,
}

/// A single passage returned by the retrieval collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub page_content: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: SearchResultMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResultMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SearchResult {
    pub fn new(page_content: impl Into<String>, score: f32) -> Self {
        Self {
            page_content: page_content.into(),
            score,
            metadata: SearchResultMetadata::default(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }
}

/// Resolved API client coordinates for an embedding or rerank model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiClientConfig {
    /// Bare model id with the provider prefix stripped
    pub model: String,
    pub provider: String,
    pub api_key: String,
    pub base_url: String,
}

impl ApiClientConfig {
    /// Normalize a provider host so it ends in `/v1`, as OpenAI-compatible
    /// embedding and rerank endpoints expect.
    pub fn normalize_base_url(api_host: &str) -> String {
        let trimmed = api_host.trim_end_matches('/');
        if trimmed.ends_with("/v1") || trimmed.contains("/v1/") {
            trimmed.to_string()
        } else {
            format!("{}/v1", trimmed)
        }
    }
}

/// Minimal parameters the retrieval collaborator needs for one base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "chunkSize")]
    pub chunk_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "chunkOverlap")]
    pub chunk_overlap: Option<u32>,
    #[serde(rename = "embedApiClient")]
    pub embed_api_client: ApiClientConfig,
    #[serde(skip_serializing_if = "Option::is_none", rename = "rerankApiClient")]
    pub rerank_api_client: Option<ApiClientConfig>,
}
