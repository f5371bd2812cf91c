//! Multi-knowledge-base search orchestration.
//!
//! Every base is searched concurrently and every per-base failure is
//! degraded to an empty contribution; a request never fails because one
//! base did. Each base gets exactly one attempt, and the combined result
//! list preserves the order the descriptors were supplied in.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::entity::{ApiClientConfig, KnowledgeBaseDescriptor, KnowledgeBaseParams, SearchResult};
use super::retrieval::RetrievalProvider;
use crate::domain::error::DomainError;
use crate::domain::provider::ProviderResolver;

/// Orchestrates fan-out searches across the request's knowledge bases
#[derive(Clone)]
pub struct KnowledgeSearcher {
    resolver: ProviderResolver,
    retrieval: Arc<dyn RetrievalProvider>,
}

impl KnowledgeSearcher {
    pub fn new(resolver: ProviderResolver, retrieval: Arc<dyn RetrievalProvider>) -> Self {
        Self { resolver, retrieval }
    }

    /// Search all supplied bases for the query, concatenating results in
    /// descriptor order. Empty input is a no-op.
    pub async fn search(
        &self,
        query: &str,
        bases: &[KnowledgeBaseDescriptor],
    ) -> Vec<SearchResult> {
        if bases.is_empty() {
            debug!("No knowledge bases supplied");
            return Vec::new();
        }

        info!(
            base_count = bases.len(),
            query_len = query.len(),
            "Searching knowledge bases"
        );

        let tasks = bases.iter().map(|base| self.search_base(query, base));
        let per_base = join_all(tasks).await;

        let results: Vec<SearchResult> = per_base.into_iter().flatten().collect();
        info!(result_count = results.len(), "Knowledge base search completed");
        results
    }

    /// Search one base, degrading every failure to an empty contribution
    async fn search_base(
        &self,
        query: &str,
        base: &KnowledgeBaseDescriptor,
    ) -> Vec<SearchResult> {
        let params = match self.to_base_params(base).await {
            Ok(params) => params,
            Err(e) => {
                warn!(base_id = %base.id, error = %e, "Skipping knowledge base, could not resolve parameters");
                return Vec::new();
            }
        };

        // A cold index can still serve a lower-quality search
        if let Err(e) = self.retrieval.warmup(&params).await {
            warn!(base_id = %base.id, error = %e, "Knowledge base warmup failed, continuing");
        }

        let results = match self.retrieval.search(query, &params).await {
            Ok(results) => results,
            Err(e) => {
                warn!(base_id = %base.id, error = %e, "Knowledge base search failed");
                return Vec::new();
            }
        };

        if params.rerank_api_client.is_none() || results.is_empty() {
            debug!(base_id = %base.id, count = results.len(), "Search complete");
            return results;
        }

        match self
            .retrieval
            .rerank(query, &params, results.clone())
            .await
        {
            Ok(reranked) => {
                debug!(base_id = %base.id, count = reranked.len(), "Rerank complete");
                reranked
            }
            Err(e) => {
                warn!(base_id = %base.id, error = %e, "Rerank failed, using original order");
                results
            }
        }
    }

    /// Resolve a descriptor's model references into collaborator parameters
    async fn to_base_params(
        &self,
        base: &KnowledgeBaseDescriptor,
    ) -> Result<KnowledgeBaseParams, DomainError> {
        let embed_model = base.model.as_ref().ok_or_else(|| {
            DomainError::validation(format!(
                "Knowledge base '{}' has no embedding model",
                base.id
            ))
        })?;

        let embed_api_client = self.model_to_api_client(embed_model).await?;

        // A broken rerank reference downgrades to no rerank rather than
        // failing the base
        let rerank_api_client = match &base.rerank_model {
            Some(rerank_model) => match self.model_to_api_client(rerank_model).await {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(base_id = %base.id, error = %e, "Could not resolve rerank model, skipping rerank");
                    None
                }
            },
            None => None,
        };

        Ok(KnowledgeBaseParams {
            id: base.id.clone(),
            dimensions: base.dimensions,
            chunk_size: base.chunk_size,
            chunk_overlap: base.chunk_overlap,
            embed_api_client,
            rerank_api_client,
        })
    }

    async fn model_to_api_client(
        &self,
        model: &crate::domain::knowledge::entity::ModelRef,
    ) -> Result<ApiClientConfig, DomainError> {
        let compound = model.compound_id()?;
        let resolved = self.resolver.resolve_provider(&compound).await?;

        Ok(ApiClientConfig {
            model: resolved.model_id,
            provider: resolved.provider.id,
            api_key: resolved.provider.api_key,
            base_url: ApiClientConfig::normalize_base_url(&resolved.provider.api_host),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::entity::ModelRef;
    use crate::domain::knowledge::retrieval::MockRetrievalProvider;
    use crate::domain::provider::{Provider, ProviderModel, ProviderSource, ProviderType};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct FixedProviders(Vec<Provider>);

    #[async_trait]
    impl ProviderSource for FixedProviders {
        async fn eligible_providers(&self) -> Vec<Provider> {
            self.0.clone()
        }
    }

    fn embed_provider() -> Provider {
        Provider {
            id: "silicon".to_string(),
            provider_type: ProviderType::Openai,
            api_key: "sk-embed".to_string(),
            api_host: "https://api.example.com".to_string(),
            enabled: true,
            models: vec![ProviderModel {
                id: "BAAI/bge-m3".to_string(),
                name: None,
                owned_by: None,
            }],
        }
    }

    fn descriptor(id: &str) -> KnowledgeBaseDescriptor {
        KnowledgeBaseDescriptor {
            id: id.to_string(),
            name: id.to_string(),
            model: Some(ModelRef {
                id: "BAAI/bge-m3".to_string(),
                name: None,
                provider: Some("silicon".to_string()),
            }),
            rerank_model: None,
            dimensions: Some(1024),
            chunk_size: None,
            chunk_overlap: None,
            items: vec![],
        }
    }

    fn searcher(retrieval: MockRetrievalProvider) -> KnowledgeSearcher {
        let resolver = ProviderResolver::new(Arc::new(FixedProviders(vec![embed_provider()])));
        KnowledgeSearcher::new(resolver, Arc::new(retrieval))
    }

    #[tokio::test]
    async fn test_empty_bases_is_noop() {
        let mut retrieval = MockRetrievalProvider::new();
        retrieval.expect_search().times(0);

        let results = searcher(retrieval).search("query", &[]).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_bases() {
        let mut retrieval = MockRetrievalProvider::new();
        retrieval.expect_warmup().returning(|_| Ok(()));
        retrieval.expect_search().returning(|_, base| match base.id.as_str() {
            "kb1" => Ok(vec![SearchResult::new("from kb1", 0.9)]),
            "kb2" => Err(DomainError::retrieval("index corrupted")),
            "kb3" => Ok(vec![SearchResult::new("from kb3", 0.4)]),
            other => panic!("unexpected base {other}"),
        });

        let bases = vec![descriptor("kb1"), descriptor("kb2"), descriptor("kb3")];
        let results = searcher(retrieval).search("query", &bases).await;

        let contents: Vec<&str> = results.iter().map(|r| r.page_content.as_str()).collect();
        assert_eq!(contents, vec!["from kb1", "from kb3"]);
    }

    #[tokio::test]
    async fn test_declared_order_preserved() {
        let mut retrieval = MockRetrievalProvider::new();
        retrieval.expect_warmup().returning(|_| Ok(()));
        retrieval.expect_search().returning(|_, base| {
            Ok(vec![SearchResult::new(base.id.clone(), 0.5)])
        });

        let bases = vec![descriptor("kb-b"), descriptor("kb-a")];
        let results = searcher(retrieval).search("query", &bases).await;

        let contents: Vec<&str> = results.iter().map(|r| r.page_content.as_str()).collect();
        assert_eq!(contents, vec!["kb-b", "kb-a"]);
    }

    #[tokio::test]
    async fn test_warmup_failure_does_not_abort_search() {
        let mut retrieval = MockRetrievalProvider::new();
        retrieval
            .expect_warmup()
            .returning(|_| Err(DomainError::retrieval("cold start failed")));
        retrieval
            .expect_search()
            .returning(|_, _| Ok(vec![SearchResult::new("still found", 0.8)]));

        let results = searcher(retrieval).search("query", &[descriptor("kb1")]).await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_unresolvable_embed_model_contributes_empty() {
        let mut retrieval = MockRetrievalProvider::new();
        retrieval.expect_search().times(0);

        let mut base = descriptor("kb1");
        base.model = Some(ModelRef {
            id: "bge-m3".to_string(),
            name: None,
            provider: Some("unknown-provider".to_string()),
        });

        let results = searcher(retrieval).search("query", &[base]).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_rerank_failure_falls_back_to_original_order() {
        let mut retrieval = MockRetrievalProvider::new();
        retrieval.expect_warmup().returning(|_| Ok(()));
        retrieval.expect_search().returning(|_, _| {
            Ok(vec![
                SearchResult::new("first", 0.6),
                SearchResult::new("second", 0.4),
            ])
        });
        retrieval
            .expect_rerank()
            .returning(|_, _, _| Err(DomainError::rerank("rerank endpoint down")));

        let mut base = descriptor("kb1");
        base.rerank_model = Some(ModelRef {
            id: "bge-reranker".to_string(),
            name: None,
            provider: Some("silicon".to_string()),
        });

        let results = searcher(retrieval).search("query", &[base]).await;
        let contents: Vec<&str> = results.iter().map(|r| r.page_content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_rerank_applied_when_configured() {
        let mut retrieval = MockRetrievalProvider::new();
        retrieval.expect_warmup().returning(|_| Ok(()));
        retrieval.expect_search().returning(|_, _| {
            Ok(vec![
                SearchResult::new("first", 0.6),
                SearchResult::new("second", 0.4),
            ])
        });
        retrieval.expect_rerank().returning(|_, _, _| {
            Ok(vec![
                SearchResult::new("second", 0.95),
                SearchResult::new("first", 0.2),
            ])
        });

        let mut base = descriptor("kb1");
        base.rerank_model = Some(ModelRef {
            id: "bge-reranker".to_string(),
            name: None,
            provider: Some("silicon".to_string()),
        });

        let results = searcher(retrieval).search("query", &[base]).await;
        assert_eq!(results[0].page_content, "second");
    }

    #[tokio::test]
    async fn test_no_rerank_call_for_empty_results() {
        let mut retrieval = MockRetrievalProvider::new();
        retrieval.expect_warmup().returning(|_| Ok(()));
        retrieval.expect_search().returning(|_, _| Ok(vec![]));
        retrieval.expect_rerank().times(0);

        let mut base = descriptor("kb1");
        base.rerank_model = Some(ModelRef {
            id: "bge-reranker".to_string(),
            name: None,
            provider: Some("silicon".to_string()),
        });

        let results = searcher(retrieval).search("query", &[base]).await;
        assert!(results.is_empty());
    }
}
