//! OpenAI-compatible chat completion types.
//!
//! The relay is deliberately loose: only the fields this gateway inspects
//! are typed, and everything else rides along in `extra` so upstream
//! providers see the caller's parameters unchanged.

use serde::{Deserialize, Serialize};

use crate::domain::knowledge::KnowledgeBaseDescriptor;

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    System,
    User,
    Assistant,
    Tool,
    Function,
}

/// Content part for multimodal messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: serde_json::Value },
}

/// Message content, either plain text or an array of content parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Text content, concatenating text parts if needed
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Whether there is any text to augment
    pub fn has_text(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Parts(parts) => parts
                .iter()
                .any(|p| matches!(p, ContentPart::Text { text } if !text.is_empty())),
        }
    }
}

/// A chat message in OpenAI format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatMessageRole,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,

    /// Fields this gateway does not inspect (name, tool_calls, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatMessageRole::User,
            content: Some(MessageContent::Text(content.into())),
            extra: serde_json::Map::new(),
        }
    }
}

/// Chat completion request (OpenAI format plus gateway extensions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Compound `provider:model` identifier
    pub model: String,

    pub messages: Vec<ChatMessage>,

    #[serde(default)]
    pub stream: bool,

    /// Gateway extension: originating assistant, logged only
    #[serde(skip_serializing)]
    pub assistant_id: Option<String>,

    /// Gateway extension: knowledge bases to search before relaying.
    /// Never forwarded upstream.
    #[serde(skip_serializing)]
    pub knowledge_bases: Option<Vec<KnowledgeBaseDescriptor>>,

    /// Pass-through sampling parameters (temperature, max_tokens, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
