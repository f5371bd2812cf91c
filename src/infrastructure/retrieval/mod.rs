//! Retrieval collaborator client and rerank execution

pub mod http;
pub mod rerank;

pub use http::HttpRetrievalService;
pub use rerank::{DefaultStrategy, Reranker, RerankStrategy, TeiStrategy};
