//! Server credential gate.
//!
//! The gateway holds a single configured secret. Callers present it via
//! `Authorization: Bearer <key>` or `X-API-Key: <key>`; comparison is
//! constant time so the secret cannot be probed byte by byte.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;

static BEARER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^bearer\s+(.+)$").unwrap());

/// Extractor that requires the server credential
#[derive(Debug, Clone)]
pub struct RequireServerKey;

impl FromRequestParts<AppState> for RequireServerKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = extract_credential_from_headers(&parts.headers)?;

        let Some(expected) = state.settings.api_key().await else {
            // No secret configured means the gate never opens
            debug!("Rejecting request: no server API key configured");
            return Err(forbidden());
        };

        if !constant_time_compare(presented.as_bytes(), expected.as_bytes()) {
            debug!("Rejecting request: credential mismatch");
            return Err(forbidden());
        }

        Ok(RequireServerKey)
    }
}

fn forbidden() -> ApiError {
    ApiError::forbidden("Invalid API key").with_code("forbidden")
}

fn extract_credential_from_headers(headers: &axum::http::HeaderMap) -> Result<String, ApiError> {
    let authorization = headers.get(header::AUTHORIZATION);

    if let Some(auth_header) = authorization {
        if let Some(token) = auth_header
            .to_str()
            .ok()
            .and_then(|s| BEARER_RE.captures(s))
            .map(|captures| captures[1].trim().to_string())
        {
            if token.is_empty() {
                return Err(ApiError::unauthorized("Empty bearer token")
                    .with_code("invalid_credentials_format"));
            }
            return Ok(token);
        }
        // A non-bearer Authorization header falls through to x-api-key
    }

    if let Some(api_key_header) = headers.get("x-api-key") {
        let key = api_key_header
            .to_str()
            .map_err(|_| {
                ApiError::unauthorized("Invalid X-API-Key header encoding")
                    .with_code("invalid_credentials_format")
            })?
            .trim();

        if key.is_empty() {
            return Err(ApiError::unauthorized("Empty X-API-Key header")
                .with_code("invalid_credentials_format"));
        }
        return Ok(key.to_string());
    }

    if authorization.is_some() {
        return Err(ApiError::unauthorized(
            "Invalid Authorization header format. Expected 'Bearer <key>'",
        )
        .with_code("invalid_credentials_format"));
    }

    Err(ApiError::unauthorized(
        "API key required. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header",
    )
    .with_code("missing_credentials"))
}

/// Compare two secrets without short-circuiting on the first mismatch
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};

    fn code(err: &ApiError) -> &str {
        err.response.error.code.as_deref().unwrap_or("")
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer sk-test-key".parse().unwrap());

        assert_eq!(
            extract_credential_from_headers(&headers).unwrap(),
            "sk-test-key"
        );
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "bearer sk-test-key".parse().unwrap());

        assert_eq!(
            extract_credential_from_headers(&headers).unwrap(),
            "sk-test-key"
        );
    }

    #[test]
    fn test_extract_x_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "sk-other-key".parse().unwrap());

        assert_eq!(
            extract_credential_from_headers(&headers).unwrap(),
            "sk-other-key"
        );
    }

    #[test]
    fn test_bearer_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer sk-bearer".parse().unwrap());
        headers.insert("x-api-key", "sk-x-api-key".parse().unwrap());

        assert_eq!(extract_credential_from_headers(&headers).unwrap(), "sk-bearer");
    }

    #[test]
    fn test_missing_credentials() {
        let err = extract_credential_from_headers(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(code(&err), "missing_credentials");
    }

    #[test]
    fn test_malformed_authorization_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        let err = extract_credential_from_headers(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(code(&err), "invalid_credentials_format");
    }

    #[test]
    fn test_non_bearer_scheme_falls_through_to_x_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        headers.insert("x-api-key", "sk-fallback".parse().unwrap());

        assert_eq!(
            extract_credential_from_headers(&headers).unwrap(),
            "sk-fallback"
        );
    }

    #[test]
    fn test_empty_bearer_token_is_invalid_format() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer   ".parse().unwrap());

        let err = extract_credential_from_headers(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(code(&err), "invalid_credentials_format");
    }

    #[test]
    fn test_blank_x_api_key_is_invalid_format() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "   ".parse().unwrap());

        let err = extract_credential_from_headers(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(code(&err), "invalid_credentials_format");
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"secret", b"secret"));
        assert!(!constant_time_compare(b"secret", b"secreT"));
        assert!(!constant_time_compare(b"secret", b"secret-longer"));
        assert!(!constant_time_compare(b"", b"x"));
        assert!(constant_time_compare(b"", b""));
    }
}
