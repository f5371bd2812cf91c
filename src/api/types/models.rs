//! OpenAI-compatible model listing types

use serde::{Deserialize, Serialize};

use crate::domain::provider::{Provider, ProviderModel};

/// Model information (OpenAI format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelObject {
    /// Compound `provider:model` identifier callers pass back as `model`
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
    /// Provider id the model was flattened out of
    pub provider: String,
    /// Bare model id within that provider
    pub provider_model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ModelObject {
    pub fn from_provider_model(provider: &Provider, model: &ProviderModel) -> Self {
        Self {
            id: format!("{}:{}", provider.id, model.id),
            object: "model".to_string(),
            created: chrono::Utc::now().timestamp(),
            owned_by: model
                .owned_by
                .clone()
                .unwrap_or_else(|| provider.id.clone()),
            provider: provider.id.clone(),
            provider_model_id: model.id.clone(),
            name: model.name.clone(),
        }
    }
}

/// List models response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<ModelObject>,
}

impl ModelsResponse {
    pub fn new(models: Vec<ModelObject>) -> Self {
        Self {
            object: "list".to_string(),
            data: models,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::ProviderType;

    #[test]
    fn test_model_object_uses_compound_id() {
        let provider = Provider {
            id: "silicon".to_string(),
            provider_type: ProviderType::Openai,
            api_key: "sk".to_string(),
            api_host: "https://api.example.com".to_string(),
            enabled: true,
            models: vec![],
        };
        let model = ProviderModel {
            id: "BAAI/bge-m3".to_string(),
            name: None,
            owned_by: Some("BAAI".to_string()),
        };

        let object = ModelObject::from_provider_model(&provider, &model);
        assert_eq!(object.id, "silicon:BAAI/bge-m3");
        assert_eq!(object.owned_by, "BAAI");
        assert_eq!(object.object, "model");
        assert_eq!(object.provider, "silicon");
        assert_eq!(object.provider_model_id, "BAAI/bge-m3");
    }

    #[test]
    fn test_models_response_shape() {
        let response = ModelsResponse::new(vec![]);
        assert_eq!(response.object, "list");
        assert!(response.data.is_empty());
    }
}
