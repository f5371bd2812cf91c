//! Knowledge base search, context injection and citations

pub mod citation;
pub mod context;
pub mod entity;
pub mod retrieval;
pub mod search;

pub use citation::{build_citations, Citation};
pub use context::format_context;
pub use entity::{
    ApiClientConfig, FileContent, KnowledgeBaseDescriptor, KnowledgeBaseParams, KnowledgeItem,
    ModelRef, SearchResult, SearchResultMetadata,
};
pub use retrieval::RetrievalProvider;
pub use search::KnowledgeSearcher;
