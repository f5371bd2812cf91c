//! Rerank execution against OpenAI-compatible and TEI rerank endpoints.
//!
//! Different rerank servers disagree on both request shape and where the
//! rankings live in the response, so each dialect is a strategy.

use std::sync::Arc;

use tracing::debug;

use crate::domain::knowledge::{ApiClientConfig, SearchResult};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

/// One entry of a rerank response: which input document, and its new score
#[derive(Debug, Clone, Copy)]
pub struct Ranking {
    pub index: usize,
    pub score: f32,
}

/// A rerank endpoint dialect
pub trait RerankStrategy: Send + Sync + std::fmt::Debug {
    fn build_url(&self, client: &ApiClientConfig) -> String;

    fn build_request_body(
        &self,
        client: &ApiClientConfig,
        query: &str,
        documents: &[&str],
    ) -> serde_json::Value;

    fn extract_rankings(&self, response: &serde_json::Value) -> Result<Vec<Ranking>, DomainError>;
}

/// Cohere/Jina-style rerank dialect, the common OpenAI-compatible shape
#[derive(Debug)]
pub struct DefaultStrategy;

impl RerankStrategy for DefaultStrategy {
    fn build_url(&self, client: &ApiClientConfig) -> String {
        format!("{}/rerank", client.base_url)
    }

    fn build_request_body(
        &self,
        client: &ApiClientConfig,
        query: &str,
        documents: &[&str],
    ) -> serde_json::Value {
        serde_json::json!({
            "model": client.model,
            "query": query,
            "documents": documents,
            "top_n": documents.len(),
        })
    }

    fn extract_rankings(&self, response: &serde_json::Value) -> Result<Vec<Ranking>, DomainError> {
        let results = response
            .get("results")
            .and_then(|v| v.as_array())
            .ok_or_else(|| DomainError::rerank("Rerank response missing 'results' array"))?;

        results
            .iter()
            .map(|entry| {
                let index = entry
                    .get("index")
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| DomainError::rerank("Rerank result missing 'index'"))?;
                let score = entry
                    .get("relevance_score")
                    .and_then(|v| v.as_f64())
                    .ok_or_else(|| DomainError::rerank("Rerank result missing 'relevance_score'"))?;
                Ok(Ranking {
                    index: index as usize,
                    score: score as f32,
                })
            })
            .collect()
    }
}

/// Text Embeddings Inference dialect: bare `texts` request, top-level array
/// response with `score` fields.
#[derive(Debug)]
pub struct TeiStrategy;

impl RerankStrategy for TeiStrategy {
    fn build_url(&self, client: &ApiClientConfig) -> String {
        // TEI serves /rerank at the root, not under /v1
        let base = client.base_url.trim_end_matches('/');
        let base = base.strip_suffix("/v1").unwrap_or(base);
        format!("{}/rerank", base)
    }

    fn build_request_body(
        &self,
        _client: &ApiClientConfig,
        query: &str,
        documents: &[&str],
    ) -> serde_json::Value {
        serde_json::json!({
            "query": query,
            "texts": documents,
            "return_text": true,
        })
    }

    fn extract_rankings(&self, response: &serde_json::Value) -> Result<Vec<Ranking>, DomainError> {
        let results = response
            .as_array()
            .ok_or_else(|| DomainError::rerank("TEI rerank response is not an array"))?;

        results
            .iter()
            .map(|entry| {
                let index = entry
                    .get("index")
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| DomainError::rerank("TEI rerank result missing 'index'"))?;
                let score = entry
                    .get("score")
                    .and_then(|v| v.as_f64())
                    .ok_or_else(|| DomainError::rerank("TEI rerank result missing 'score'"))?;
                Ok(Ranking {
                    index: index as usize,
                    score: score as f32,
                })
            })
            .collect()
    }
}

/// Pick the dialect for a rerank client configuration
pub fn strategy_for(client: &ApiClientConfig) -> Box<dyn RerankStrategy> {
    if client.provider.to_lowercase().contains("tei") {
        Box::new(TeiStrategy)
    } else {
        Box::new(DefaultStrategy)
    }
}

/// Executes rerank calls and rescores search results
#[derive(Debug, Clone)]
pub struct Reranker {
    http_client: Arc<dyn HttpClientTrait>,
}

impl Reranker {
    pub fn new(http_client: Arc<dyn HttpClientTrait>) -> Self {
        Self { http_client }
    }

    /// Rescore `results` with the configured rerank model.
    ///
    /// Returns the ranked subset in descending score order. Documents the
    /// endpoint omits are dropped.
    pub async fn rerank(
        &self,
        client: &ApiClientConfig,
        query: &str,
        results: Vec<SearchResult>,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if results.is_empty() {
            return Ok(results);
        }

        let strategy = strategy_for(client);
        let url = strategy.build_url(client);
        let documents: Vec<&str> = results.iter().map(|r| r.page_content.as_str()).collect();
        let body = strategy.build_request_body(client, query, &documents);
        let auth = format!("Bearer {}", client.api_key);

        debug!(url = %url, documents = documents.len(), "Reranking search results");
        let response = self
            .http_client
            .post_json(&url, vec![("Authorization", &auth)], &body)
            .await
            .map_err(|e| DomainError::rerank(format!("Rerank request failed: {}", e)))?;

        let mut rankings = strategy.extract_rankings(&response)?;
        rankings.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let reranked = rankings
            .into_iter()
            .filter_map(|ranking| {
                results.get(ranking.index).map(|result| {
                    let mut result = result.clone();
                    result.score = ranking.score;
                    result
                })
            })
            .collect();

        Ok(reranked)
    }
}
