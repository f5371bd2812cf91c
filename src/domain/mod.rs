//! Domain layer: entities and request-time pipeline logic

pub mod error;
pub mod knowledge;
pub mod provider;

pub use error::DomainError;
pub use knowledge::{
    build_citations, Citation, KnowledgeBaseDescriptor, KnowledgeBaseParams, KnowledgeSearcher,
    RetrievalProvider, SearchResult,
};
pub use provider::{Provider, ProviderResolver, ProviderSource, ResolvedModel};
