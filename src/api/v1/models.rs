//! Models endpoint handlers

use axum::extract::{Path, State};
use tracing::debug;

use crate::api::middleware::RequireServerKey;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ModelObject, ModelsResponse};
use crate::domain::provider::split_model_id;

/// GET /v1/models
///
/// Flattens every eligible provider's advertised models into one list
/// under their compound `provider:model` identifiers.
pub async fn list_models(
    State(state): State<AppState>,
    _auth: RequireServerKey,
) -> Result<Json<ModelsResponse>, ApiError> {
    debug!("Listing models from all eligible providers");

    let providers = state.settings.snapshot().await.providers;
    let models: Vec<ModelObject> = providers
        .iter()
        .filter(|p| p.is_eligible())
        .flat_map(|provider| {
            provider
                .models
                .iter()
                .map(|model| ModelObject::from_provider_model(provider, model))
        })
        .collect();

    Ok(Json(ModelsResponse::new(models)))
}

/// GET /v1/models/{model_id}
pub async fn get_model(
    State(state): State<AppState>,
    _auth: RequireServerKey,
    Path(model_id): Path<String>,
) -> Result<Json<ModelObject>, ApiError> {
    debug!(model_id = %model_id, "Getting model");

    let (provider_id, bare_id) = split_model_id(&model_id)?;

    let providers = state.settings.snapshot().await.providers;
    let provider = providers
        .iter()
        .filter(|p| p.is_eligible())
        .find(|p| p.id == provider_id)
        .ok_or_else(|| {
            ApiError::not_found(format!("Model '{}' not found", model_id))
                .with_code("provider_not_found")
        })?;

    let model = provider
        .models
        .iter()
        .find(|m| m.id == bare_id)
        .ok_or_else(|| {
            ApiError::not_found(format!("Model '{}' not found", model_id))
                .with_code("model_not_available")
        })?;

    Ok(Json(ModelObject::from_provider_model(provider, model)))
}
