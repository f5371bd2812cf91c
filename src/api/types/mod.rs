//! API request/response types

pub mod chat;
pub mod error;
pub mod json;
pub mod knowledge;
pub mod models;

pub use chat::{ChatCompletionRequest, ChatMessage, ChatMessageRole, ContentPart, MessageContent};
pub use error::{classify_upstream_error, ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use knowledge::{KnowledgeBaseSummary, KnowledgeBasesResponse};
pub use models::{ModelObject, ModelsResponse};
