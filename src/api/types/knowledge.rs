//! Knowledge base listing types.
//!
//! Listings are sanitized summaries: configured descriptors carry item
//! records and model references that are not the caller's business.

use serde::{Deserialize, Serialize};

use crate::domain::knowledge::KnowledgeBaseDescriptor;

/// Summary of a configured knowledge base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_model: Option<String>,
    pub item_count: usize,
}

impl KnowledgeBaseSummary {
    pub fn from_descriptor(base: &KnowledgeBaseDescriptor) -> Self {
        Self {
            id: base.id.clone(),
            name: base.name.clone(),
            embedding_model: base
                .model
                .as_ref()
                .and_then(|m| m.compound_id().ok()),
            rerank_model: base
                .rerank_model
                .as_ref()
                .and_then(|m| m.compound_id().ok()),
            item_count: base.items.len(),
        }
    }
}

/// List knowledge bases response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBasesResponse {
    pub object: String,
    pub data: Vec<KnowledgeBaseSummary>,
}

impl KnowledgeBasesResponse {
    pub fn new(bases: Vec<KnowledgeBaseSummary>) -> Self {
        Self {
            object: "list".to_string(),
            data: bases,
        }
    }
}
