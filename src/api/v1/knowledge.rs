//! Knowledge base listing handlers

use axum::extract::{Path, State};
use tracing::debug;

use crate::api::middleware::RequireServerKey;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, KnowledgeBaseSummary, KnowledgeBasesResponse};

/// GET /v1/knowledge
pub async fn list_knowledge_bases(
    State(state): State<AppState>,
    _auth: RequireServerKey,
) -> Result<Json<KnowledgeBasesResponse>, ApiError> {
    debug!("Listing configured knowledge bases");

    let bases = state.settings.knowledge_bases().await;
    let summaries = bases.iter().map(KnowledgeBaseSummary::from_descriptor).collect();

    Ok(Json(KnowledgeBasesResponse::new(summaries)))
}

/// GET /v1/knowledge/{base_id}
pub async fn get_knowledge_base(
    State(state): State<AppState>,
    _auth: RequireServerKey,
    Path(base_id): Path<String>,
) -> Result<Json<KnowledgeBaseSummary>, ApiError> {
    debug!(base_id = %base_id, "Getting knowledge base");

    let bases = state.settings.knowledge_bases().await;
    let base = bases
        .iter()
        .find(|b| b.id == base_id)
        .ok_or_else(|| ApiError::not_found(format!("Knowledge base '{}' not found", base_id)))?;

    Ok(Json(KnowledgeBaseSummary::from_descriptor(base)))
}
