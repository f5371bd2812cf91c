//! Retrieval collaborator seam

use async_trait::async_trait;

use super::entity::{KnowledgeBaseParams, SearchResult};
use crate::domain::error::DomainError;

/// The retrieval collaborator: owns the vector index, embeddings and
/// rerank execution. This core only composes its results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RetrievalProvider: Send + Sync {
    /// Ensure the collaborator has an initialized index for this base.
    /// Create-or-get semantics; safe to call repeatedly.
    async fn warmup(&self, base: &KnowledgeBaseParams) -> Result<(), DomainError>;

    /// Search one knowledge base for the query
    async fn search(
        &self,
        query: &str,
        base: &KnowledgeBaseParams,
    ) -> Result<Vec<SearchResult>, DomainError>;

    /// Rescore results with the base's rerank model
    async fn rerank(
        &self,
        query: &str,
        base: &KnowledgeBaseParams,
        results: Vec<SearchResult>,
    ) -> Result<Vec<SearchResult>, DomainError>;
}
