//! Upstream LLM relay plumbing

pub mod http_client;
pub mod upstream;

pub use http_client::{HttpClient, HttpClientTrait};
pub use upstream::{ChunkStream, OpenAiUpstreamClient, SseFrameDecoder, StreamEvent, UpstreamClient};
