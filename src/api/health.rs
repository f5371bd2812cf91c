//! Health check endpoints for Kubernetes probes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

/// Health response with optional component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Simple health check - returns 200 if the service is running
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check - verifies the gateway can actually serve requests.
/// Degraded states still return 200; the gate rejects per-request instead.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = Vec::new();
    let mut overall_status = HealthStatus::Healthy;

    let credential_check = if state.settings.api_key().await.is_some() {
        HealthCheck {
            name: "credential".to_string(),
            status: HealthStatus::Healthy,
            message: None,
        }
    } else {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            name: "credential".to_string(),
            status: HealthStatus::Degraded,
            message: Some("No server API key configured".to_string()),
        }
    };
    checks.push(credential_check);

    let provider_count = state.settings.provider_count().await;
    let provider_check = if provider_count > 0 {
        HealthCheck {
            name: "providers".to_string(),
            status: HealthStatus::Healthy,
            message: None,
        }
    } else {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            name: "providers".to_string(),
            status: HealthStatus::Degraded,
            message: Some("No providers configured".to_string()),
        }
    };
    checks.push(provider_check);

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
    };

    (StatusCode::OK, Json(response))
}

/// Liveness check for Kubernetes liveness probes
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
