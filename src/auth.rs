use crate::errors::AppError;
use crate::handlers::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "X-API-KEY";

const DOCS_PATH_PREFIXES: [&str; 2] = ["/swagger-ui", "/v3/api-docs"];

/// API documentation is served without a key.
pub fn is_docs_path(path: &str) -> bool {
    DOCS_PATH_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Rejects every non-documentation request that does not carry the configured key.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !is_docs_path(request.uri().path()) {
        validate_api_key(state.api_key.as_deref(), request.headers())?;
    }

    Ok(next.run(request).await)
}

/// Checks `X-API-KEY` against the configured secret.
///
/// With no secret configured every request is rejected.
pub fn validate_api_key(expected: Option<&str>, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Err(AppError::Unauthorized("No API key configured".to_string()));
    };

    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", API_KEY_HEADER)))?;

    if !keys_match(presented, expected) {
        return Err(AppError::Unauthorized("Invalid API key".to_string()));
    }

    Ok(())
}

/// Constant-time comparison over SHA-256 digests, so length differences don't
/// short-circuit either.
fn keys_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Short identifier for the configured key, safe to log.
pub fn key_fingerprint(key: &str) -> String {
    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    digest[..12].to_string()
}
