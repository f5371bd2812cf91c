//! Infrastructure layer: outbound clients, settings and process plumbing

pub mod llm;
pub mod logging;
pub mod retrieval;
pub mod settings;
