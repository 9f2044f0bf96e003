//! Bearer-token authentication middleware.
//!
//! The `/health` endpoint stays open so probes work without credentials.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

/// Expected API key, held as bytes for constant-time comparison.
#[derive(Debug, Clone)]
pub struct ApiKeyConfig {
    key_bytes: Vec<u8>,
}

impl ApiKeyConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key_bytes: key.into().into_bytes(),
        }
    }

    /// Constant-time comparison: accumulate the XOR of every byte pair so
    /// timing does not reveal where a mismatch occurs.
    fn verify(&self, provided: &[u8]) -> bool {
        if self.key_bytes.len() != provided.len() {
            return false;
        }
        let mut acc: u8 = 0;
        for (a, b) in self.key_bytes.iter().zip(provided.iter()) {
            acc |= a ^ b;
        }
        acc == 0
    }
}

#[derive(Debug, serde::Serialize)]
struct AuthError {
    error: &'static str,
    code: &'static str,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn unauthorized(message: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(AuthError {
            error: message,
            code: "UNAUTHORIZED",
        }),
    )
        .into_response()
}

/// Reject requests without a valid bearer token, except `/health`.
pub async fn require_api_key(
    config: ApiKeyConfig,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    match bearer_token(request.headers()) {
        Some(token) if config.verify(token.as_bytes()) => next.run(request).await,
        Some(_) => {
            warn!("Rejected request with invalid API key");
            unauthorized("invalid API key")
        }
        None => unauthorized("missing bearer token"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_exact_match() {
        let config = ApiKeyConfig::new("secret-key");
        assert!(config.verify(b"secret-key"));
    }

    #[test]
    fn verify_rejects_wrong_key_and_wrong_length() {
        let config = ApiKeyConfig::new("secret-key");
        assert!(!config.verify(b"secret-kez"));
        assert!(!config.verify(b"secret"));
        assert!(!config.verify(b""));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));

        let mut basic = HeaderMap::new();
        basic.insert("authorization", "Basic abc123".parse().unwrap());
        assert_eq!(bearer_token(&basic), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
