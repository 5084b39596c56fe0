//! Authentication middleware for API token validation
//!
//! Intercepts HTTP requests on guarded routes, extracts the caller's
//! token from `X-API-Token` or `Authorization: Bearer` and compares it
//! against the configured secret before any handler logic runs.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::config::ServiceConfig;
use crate::errors::ServiceError;

/// Header name for the API token
const API_TOKEN_HEADER: &str = "X-API-Token";

/// Alternative header name (for compatibility)
const AUTHORIZATION_HEADER: &str = "Authorization";

/// Bearer token prefix
const BEARER_PREFIX: &str = "Bearer ";

/// Extract the API token from request headers
fn extract_api_token(headers: &HeaderMap) -> Option<String> {
    // Try X-API-Token header first
    if let Some(value) = headers.get(API_TOKEN_HEADER) {
        if let Ok(token) = value.to_str() {
            return Some(token.to_string());
        }
    }

    // Try Authorization header with Bearer token
    if let Some(value) = headers.get(AUTHORIZATION_HEADER) {
        if let Ok(auth) = value.to_str() {
            if let Some(token) = auth.strip_prefix(BEARER_PREFIX) {
                return Some(token.to_string());
            }
        }
    }

    None
}

/// Authentication middleware for API endpoints.
///
/// The mismatch path logs the caller's address but never the expected
/// secret, so a misconfigured client cannot be used to fish for it.
#[instrument(skip_all)]
pub async fn auth_middleware(
    State(config): State<Arc<ServiceConfig>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let path = request.uri().path().to_string();

    // Health checks are unauthenticated
    if path == "/health" {
        debug!("Skipping auth for endpoint: {}", path);
        return Ok(next.run(request).await);
    }

    match extract_api_token(request.headers()) {
        Some(token) if token == config.api_token => {
            debug!("Authenticated request from {} to {}", addr, path);
            Ok(next.run(request).await)
        }
        _ => {
            warn!("Unauthorized access attempt from {} to {}", addr, path);
            Err(ServiceError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(API_TOKEN_HEADER, HeaderValue::from_static("tok-123"));

        let token = extract_api_token(&headers);
        assert_eq!(token, Some("tok-123".to_string()));
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION_HEADER,
            HeaderValue::from_static("Bearer tok-456"),
        );

        let token = extract_api_token(&headers);
        assert_eq!(token, Some("tok-456".to_string()));
    }

    #[test]
    fn test_api_token_header_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(API_TOKEN_HEADER, HeaderValue::from_static("primary"));
        headers.insert(
            AUTHORIZATION_HEADER,
            HeaderValue::from_static("Bearer secondary"),
        );

        assert_eq!(extract_api_token(&headers), Some("primary".to_string()));
    }

    #[test]
    fn test_missing_token() {
        let headers = HeaderMap::new();
        assert_eq!(extract_api_token(&headers), None);
    }

    #[test]
    fn test_non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION_HEADER,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(extract_api_token(&headers), None);
    }
}
