use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid model format: {message}")]
    InvalidModelFormat { message: String },

    #[error("Provider not found: {message}")]
    ProviderNotFound { message: String },

    #[error("Model not available: {message}")]
    ModelNotAvailable { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Retrieval error: {message}")]
    Retrieval { message: String },

    #[error("Rerank error: {message}")]
    Rerank { message: String },

    #[error("Upstream error: {message}")]
    Upstream { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn invalid_model_format(message: impl Into<String>) -> Self {
        Self::InvalidModelFormat {
            message: message.into(),
        }
    }

    pub fn provider_not_found(message: impl Into<String>) -> Self {
        Self::ProviderNotFound {
            message: message.into(),
        }
    }

    pub fn model_not_available(message: impl Into<String>) -> Self {
        Self::ModelNotAvailable {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
        }
    }

    pub fn rerank(message: impl Into<String>) -> Self {
        Self::Rerank {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
