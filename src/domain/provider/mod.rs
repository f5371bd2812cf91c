//! Provider entities and compound model-id resolution

pub mod entity;
pub mod resolver;

pub use entity::{Provider, ProviderModel, ProviderType};
pub use resolver::{split_model_id, ProviderResolver, ProviderSource, ResolvedModel};
