//! HTTP client for the retrieval collaborator service

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::rerank::Reranker;
use crate::domain::knowledge::{KnowledgeBaseParams, SearchResult};
use crate::domain::{DomainError, RetrievalProvider};
use crate::infrastructure::llm::HttpClientTrait;

/// Talks to the retrieval collaborator over HTTP.
///
/// The collaborator owns the vector index; this client only asks it to
/// materialize bases and run searches. Rerank calls go straight to the
/// configured rerank endpoint instead.
#[derive(Debug)]
pub struct HttpRetrievalService {
    http_client: Arc<dyn HttpClientTrait>,
    base_url: String,
    reranker: Reranker,
    /// Bases already warmed by this process; create-or-get upstream makes
    /// re-sending harmless but skipping it saves a round trip per request.
    warmed: RwLock<HashSet<String>>,
}

impl HttpRetrievalService {
    pub fn new(http_client: Arc<dyn HttpClientTrait>, base_url: impl Into<String>) -> Self {
        let reranker = Reranker::new(http_client.clone());
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            reranker,
            warmed: RwLock::new(HashSet::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl RetrievalProvider for HttpRetrievalService {
    async fn warmup(&self, base: &KnowledgeBaseParams) -> Result<(), DomainError> {
        if self.warmed.read().await.contains(&base.id) {
            return Ok(());
        }

        let body = serde_json::to_value(base)
            .map_err(|e| DomainError::retrieval(format!("Failed to encode base params: {}", e)))?;

        self.http_client
            .post_json(&self.url("/knowledge/create"), vec![], &body)
            .await
            .map_err(|e| DomainError::retrieval(format!("Knowledge base warmup failed: {}", e)))?;

        info!(base_id = %base.id, "Knowledge base warmed");
        self.warmed.write().await.insert(base.id.clone());
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        base: &KnowledgeBaseParams,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let body = serde_json::json!({
            "search": query,
            "base": base,
        });

        let response = self
            .http_client
            .post_json(&self.url("/knowledge/search"), vec![], &body)
            .await
            .map_err(|e| DomainError::retrieval(format!("Knowledge search failed: {}", e)))?;

        let results: Vec<SearchResult> = serde_json::from_value(response)
            .map_err(|e| DomainError::retrieval(format!("Malformed search response: {}", e)))?;

        debug!(base_id = %base.id, count = results.len(), "Knowledge search returned");
        Ok(results)
    }

    async fn rerank(
        &self,
        query: &str,
        base: &KnowledgeBaseParams,
        results: Vec<SearchResult>,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let Some(client) = &base.rerank_api_client else {
            return Ok(results);
        };
        self.reranker.rerank(client, query, results).await
    }
}
