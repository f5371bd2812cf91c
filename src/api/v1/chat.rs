//! Chat completions endpoint handler

use axum::{
    extract::State,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
};
use futures::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::middleware::RequireServerKey;
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, ChatCompletionRequest, ChatMessageRole, Json, MessageContent,
};
use crate::domain::knowledge::{build_citations, format_context, Citation};
use crate::infrastructure::llm::{ChunkStream, StreamEvent};

/// POST /v1/chat/completions
pub async fn create_chat_completion(
    State(state): State<AppState>,
    _auth: RequireServerKey,
    Json(mut request): Json<ChatCompletionRequest>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        model = %request.model,
        stream = request.stream,
        assistant_id = request.assistant_id.as_deref().unwrap_or("-"),
        "Processing chat completion request"
    );

    if request.messages.is_empty() {
        return Err(ApiError::bad_request("Messages cannot be empty")
            .with_param("messages")
            .with_code("validation_failed"));
    }

    let resolved = state.resolver.resolve_chat_model(&request.model).await?;

    let citations = augment_with_knowledge(&state, &mut request).await;

    // Extension fields are skipped during serialization, so the upstream
    // body carries only what an OpenAI-compatible endpoint understands.
    let body = serde_json::to_value(&request)
        .map_err(|e| ApiError::internal(format!("Failed to encode request: {}", e)))?;

    if request.stream {
        // Open the upstream stream before committing to an SSE response,
        // so startup failures still surface as plain HTTP errors.
        let stream = state
            .upstream
            .complete_stream(&resolved.provider, &resolved.model_id, &body)
            .await
            .map_err(ApiError::from)?;

        let (tx, rx) = tokio::sync::mpsc::channel::<Result<Event, std::convert::Infallible>>(32);
        tokio::spawn(pump_stream(stream, citations, tx));

        Ok(Sse::new(ReceiverStream::new(rx))
            .keep_alive(axum::response::sse::KeepAlive::default())
            .into_response())
    } else {
        let mut response = state
            .upstream
            .complete(&resolved.provider, &resolved.model_id, &body)
            .await
            .map_err(ApiError::from)?;

        if !citations.is_empty() {
            splice_citations_into_message(&mut response, &citations);
        }

        Ok(Json(response).into_response())
    }
}

/// Search the request's knowledge bases and inject the retrieved context
/// into the last user message. Returns the citations for the response.
///
/// Retrieval is best-effort: any condition that prevents augmentation
/// leaves the conversation untouched rather than failing the request.
async fn augment_with_knowledge(
    state: &AppState,
    request: &mut ChatCompletionRequest,
) -> Vec<Citation> {
    let Some(bases) = request.knowledge_bases.clone() else {
        return Vec::new();
    };
    if bases.is_empty() {
        return Vec::new();
    }

    let Some(last) = request.messages.last_mut() else {
        return Vec::new();
    };
    if last.role != ChatMessageRole::User {
        warn!("Last message is not from the user, skipping knowledge search");
        return Vec::new();
    }
    // Only a plain string tail is rewritten; multimodal content relays
    // untouched.
    let query = match &last.content {
        Some(MessageContent::Text(text)) if !text.is_empty() => text.clone(),
        Some(MessageContent::Parts(_)) => {
            warn!("Last user message is multimodal, skipping knowledge search");
            return Vec::new();
        }
        _ => {
            warn!("Last user message has no text, skipping knowledge search");
            return Vec::new();
        }
    };
    let results = state.searcher.search(&query, &bases).await;
    if results.is_empty() {
        return Vec::new();
    }

    info!(
        base_count = bases.len(),
        result_count = results.len(),
        "Injecting knowledge base context"
    );

    let context = format_context(&results);
    last.content = Some(MessageContent::Text(format!("{}{}", context, query)));

    build_citations(&results, &bases)
}

/// Relay decoded upstream events to the client as SSE frames.
///
/// Citations ride on the first chunk. A mid-stream upstream failure is
/// reported as a single error frame and the stream ends without `[DONE]`,
/// since the completion did not finish.
pub(crate) async fn pump_stream(
    mut stream: ChunkStream,
    citations: Vec<Citation>,
    tx: tokio::sync::mpsc::Sender<Result<Event, std::convert::Infallible>>,
) {
    let mut citations = Some(citations).filter(|c| !c.is_empty());

    while let Some(event) = stream.next().await {
        match event {
            Ok(StreamEvent::Chunk(mut chunk)) => {
                if let Some(citations) = citations.take() {
                    if let Ok(value) = serde_json::to_value(&citations) {
                        chunk["citations"] = value;
                    }
                }

                let data = match serde_json::to_string(&chunk) {
                    Ok(data) => data,
                    Err(e) => {
                        error!(error = %e, "Failed to re-encode stream chunk");
                        continue;
                    }
                };
                if tx.send(Ok(Event::default().data(data))).await.is_err() {
                    // Client went away
                    return;
                }
            }
            Ok(StreamEvent::Done) => {
                let _ = tx.send(Ok(Event::default().data("[DONE]"))).await;
                return;
            }
            Err(e) => {
                error!(error = %e, "Upstream stream failed mid-flight");
                let frame = serde_json::json!({
                    "error": {
                        "message": e.to_string(),
                        "type": "server_error",
                        "code": "stream_error",
                    }
                });
                let _ = tx
                    .send(Ok(Event::default().data(frame.to_string())))
                    .await;
                return;
            }
        }
    }
}

/// Attach citations to the first choice's message
fn splice_citations_into_message(response: &mut serde_json::Value, citations: &[Citation]) {
    let Ok(value) = serde_json::to_value(citations) else {
        return;
    };
    if let Some(message) = response
        .get_mut("choices")
        .and_then(|c| c.get_mut(0))
        .and_then(|c| c.get_mut("message"))
    {
        message["citations"] = value;
    }
}
