//! OpenAI-compatible upstream chat completion client.
//!
//! Streaming responses arrive as server-sent events. Chunk boundaries on
//! the wire do not line up with frame boundaries, so the decoder buffers
//! partial frames across reads.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::BytesMut;
use futures::{stream, Stream, StreamExt};
use tracing::{debug, warn};

use super::http_client::HttpClientTrait;
use crate::domain::knowledge::ApiClientConfig;
use crate::domain::provider::Provider;
use crate::domain::DomainError;

/// One decoded event from an upstream SSE stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A parsed chat completion chunk
    Chunk(serde_json::Value),
    /// The `[DONE]` sentinel
    Done,
}

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, DomainError>> + Send>>;

/// Client for relaying chat completions to an upstream provider
#[async_trait]
pub trait UpstreamClient: Send + Sync + std::fmt::Debug {
    async fn complete(
        &self,
        provider: &Provider,
        model_id: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    async fn complete_stream(
        &self,
        provider: &Provider,
        model_id: &str,
        body: &serde_json::Value,
    ) -> Result<ChunkStream, DomainError>;
}

/// Incremental decoder for `text/event-stream` bodies.
///
/// Feed raw bytes as they arrive; complete frames are returned and any
/// trailing partial frame is kept for the next read. The buffer holds raw
/// bytes and only complete frames are decoded as UTF-8, so a multibyte
/// character split across two reads is reassembled rather than mangled.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buffer: BytesMut,
}

impl SseFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a read's worth of bytes and return the events completed by it
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        loop {
            let Some(boundary) = self.find_frame_boundary() else {
                break;
            };
            let frame_bytes = self.buffer.split_to(boundary.end);
            let frame = String::from_utf8_lossy(&frame_bytes[..boundary.start]);
            if let Some(event) = Self::decode_frame(&frame) {
                events.push(event);
            }
        }
        events
    }

    fn find_frame_boundary(&self) -> Option<std::ops::Range<usize>> {
        let lf = find_subsequence(&self.buffer, b"\n\n").map(|i| i..i + 2);
        let crlf = find_subsequence(&self.buffer, b"\r\n\r\n").map(|i| i..i + 4);
        match (lf, crlf) {
            (Some(a), Some(b)) => Some(if a.start <= b.start { a } else { b }),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    fn decode_frame(frame: &str) -> Option<StreamEvent> {
        // A frame may span several lines; only `data:` lines carry payload
        let mut data = String::new();
        for line in frame.lines() {
            if let Some(rest) = line.strip_prefix("data:") {
                if !data.is_empty() {
                    data.push('\n');
                }
                data.push_str(rest.trim_start());
            }
        }

        if data.is_empty() {
            return None;
        }
        if data == "[DONE]" {
            return Some(StreamEvent::Done);
        }

        match serde_json::from_str(&data) {
            Ok(value) => Some(StreamEvent::Chunk(value)),
            Err(e) => {
                warn!(error = %e, "Skipping malformed stream frame");
                None
            }
        }
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Relays requests to OpenAI-compatible `/chat/completions` endpoints
#[derive(Debug, Clone)]
pub struct OpenAiUpstreamClient {
    http_client: Arc<dyn HttpClientTrait>,
}

impl OpenAiUpstreamClient {
    pub fn new(http_client: Arc<dyn HttpClientTrait>) -> Self {
        Self { http_client }
    }

    fn completions_url(provider: &Provider) -> String {
        format!(
            "{}/chat/completions",
            ApiClientConfig::normalize_base_url(&provider.api_host)
        )
    }

    fn prepare_body(model_id: &str, body: &serde_json::Value) -> serde_json::Value {
        let mut body = body.clone();
        // The upstream sees the bare model id, not the compound form
        body["model"] = serde_json::Value::String(model_id.to_string());
        body
    }
}

#[async_trait]
impl UpstreamClient for OpenAiUpstreamClient {
    async fn complete(
        &self,
        provider: &Provider,
        model_id: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let url = Self::completions_url(provider);
        let auth = format!("Bearer {}", provider.api_key);
        let body = Self::prepare_body(model_id, body);

        debug!(provider_id = %provider.id, model_id = %model_id, "Relaying completion");
        self.http_client
            .post_json(&url, vec![("Authorization", &auth)], &body)
            .await
    }

    async fn complete_stream(
        &self,
        provider: &Provider,
        model_id: &str,
        body: &serde_json::Value,
    ) -> Result<ChunkStream, DomainError> {
        let url = Self::completions_url(provider);
        let auth = format!("Bearer {}", provider.api_key);
        let body = Self::prepare_body(model_id, body);

        debug!(provider_id = %provider.id, model_id = %model_id, "Relaying streaming completion");
        let bytes = self
            .http_client
            .post_json_stream(
                &url,
                vec![("Authorization", &auth), ("Accept", "text/event-stream")],
                &body,
            )
            .await?;

        let mut decoder = SseFrameDecoder::new();
        let events = bytes.flat_map(move |result| match result {
            Ok(chunk) => {
                let decoded: Vec<_> = decoder.feed(&chunk).into_iter().map(Ok).collect();
                stream::iter(decoded)
            }
            Err(e) => stream::iter(vec![Err(e)]),
        });

        Ok(Box::pin(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::ProviderType;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use serde_json::json;

    fn provider(host: &str) -> Provider {
        Provider {
            id: "my-openai".to_string(),
            provider_type: ProviderType::Openai,
            api_key: "sk-upstream".to_string(),
            api_host: host.to_string(),
            enabled: true,
            models: vec![],
        }
    }

    #[test]
    fn test_decoder_single_frame() {
        let mut decoder = SseFrameDecoder::new();
        let events = decoder.feed(b"data: {\"id\":\"c1\"}\n\n");
        assert_eq!(events, vec![StreamEvent::Chunk(json!({"id": "c1"}))]);
    }

    #[test]
    fn test_decoder_frame_split_across_reads() {
        let mut decoder = SseFrameDecoder::new();
        assert!(decoder.feed(b"data: {\"id\":").is_empty());
        assert!(decoder.feed(b"\"c1\"}").is_empty());
        let events = decoder.feed(b"\n\ndata: [DONE]\n\n");
        assert_eq!(
            events,
            vec![StreamEvent::Chunk(json!({"id": "c1"})), StreamEvent::Done]
        );
    }

    #[test]
    fn test_decoder_multiple_frames_in_one_read() {
        let mut decoder = SseFrameDecoder::new();
        let events = decoder.feed(b"data: {\"a\":1}\n\ndata: {\"a\":2}\n\n");
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_decoder_crlf_boundaries() {
        let mut decoder = SseFrameDecoder::new();
        let events = decoder.feed(b"data: {\"a\":1}\r\n\r\ndata: [DONE]\r\n\r\n");
        assert_eq!(
            events,
            vec![StreamEvent::Chunk(json!({"a": 1})), StreamEvent::Done]
        );
    }

    #[test]
    fn test_decoder_reassembles_multibyte_split_across_reads() {
        let mut decoder = SseFrameDecoder::new();
        let frame = "data: {\"delta\":\"你好\"}\n\n".as_bytes();
        // Split inside the first three-byte character
        let (head, tail) = frame.split_at(17);

        assert!(decoder.feed(head).is_empty());
        let events = decoder.feed(tail);
        assert_eq!(events, vec![StreamEvent::Chunk(json!({"delta": "你好"}))]);
    }

    #[test]
    fn test_decoder_skips_comments_and_malformed() {
        let mut decoder = SseFrameDecoder::new();
        assert!(decoder.feed(b": keep-alive\n\n").is_empty());
        assert!(decoder.feed(b"data: not json\n\n").is_empty());
    }

    #[tokio::test]
    async fn test_complete_sets_bare_model_and_auth() {
        let response = json!({"id": "cmpl-1", "choices": []});
        let mock = MockHttpClient::new().with_response(
            "https://api.example.com/v1/chat/completions",
            response.clone(),
        );
        let client = OpenAiUpstreamClient::new(Arc::new(mock));

        let result = client
            .complete(
                &provider("https://api.example.com"),
                "gpt-4o",
                &json!({"model": "my-openai:gpt-4o", "messages": []}),
            )
            .await
            .unwrap();

        assert_eq!(result, response);
    }

    #[test]
    fn test_prepare_body_strips_compound_model() {
        let body = OpenAiUpstreamClient::prepare_body(
            "gpt-4o",
            &json!({"model": "my-openai:gpt-4o", "stream": true}),
        );
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["stream"], true);
    }

    #[tokio::test]
    async fn test_complete_stream_decodes_frames() {
        let mock = MockHttpClient::new().with_stream_response(
            "https://api.example.com/v1/chat/completions",
            vec![
                bytes::Bytes::from_static(b"data: {\"id\":\"c1\"}\n\nda"),
                bytes::Bytes::from_static(b"ta: {\"id\":\"c2\"}\n\ndata: [DONE]\n\n"),
            ],
        );
        let client = OpenAiUpstreamClient::new(Arc::new(mock));

        let stream = client
            .complete_stream(
                &provider("https://api.example.com"),
                "gpt-4o",
                &json!({"model": "my-openai:gpt-4o", "stream": true}),
            )
            .await
            .unwrap();

        let events: Vec<_> = stream.collect().await;
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Ok(StreamEvent::Chunk(_))));
        assert!(matches!(events[2], Ok(StreamEvent::Done)));
    }

    #[tokio::test]
    async fn test_pre_stream_failure_is_an_error() {
        let mock = MockHttpClient::new().with_error(
            "https://api.example.com/v1/chat/completions",
            "HTTP 401 Unauthorized: Incorrect API key provided",
        );
        let client = OpenAiUpstreamClient::new(Arc::new(mock));

        let Err(err) = client
            .complete_stream(
                &provider("https://api.example.com"),
                "gpt-4o",
                &json!({"stream": true}),
            )
            .await
        else {
            panic!("expected a pre-stream failure");
        };
        assert!(matches!(err, DomainError::Upstream { .. }));
    }
}
