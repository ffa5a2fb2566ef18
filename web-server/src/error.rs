// web-server/src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::{json, Value};
use thiserror::Error;

/// Why a caller could not be authenticated. Every variant is a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication service unavailable")]
    BackendUnreachable,
    #[error("Unauthorized - Not logged in")]
    NoSession,
    #[error("Unauthorized - Missing token")]
    MissingToken,
    #[error("Unauthorized - Token expired")]
    TokenExpired,
}

impl AuthError {
    /// Short reason for logs
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::BackendUnreachable => "backend_unreachable",
            AuthError::NoSession => "not_logged_in",
            AuthError::MissingToken => "missing_token",
            AuthError::TokenExpired => "token_expired",
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized().json(json!({ "error": self.to_string() }))
    }
}

/// The backend could not be reached or did not answer
#[derive(Debug, Error)]
#[error("backend request failed: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError(e.to_string())
    }
}

/// Session signing could not be set up or a session token could not be signed
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session secret is empty")]
    MissingSecret,
    #[error("session algorithm must be HS256, HS384 or HS512, got {0}")]
    UnsupportedAlgorithm(String),
    #[error("failed to sign session: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

impl ResponseError for SessionError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::InternalServerError().json(json!({ "error": "Failed to establish session" }))
    }
}

/// Failures surfaced by proxied routes
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Backend answered non-2xx; `body` is what the caller sees
    #[error("backend returned {status}")]
    Upstream { status: StatusCode, body: Value },
    /// Backend answered 2xx with something that is not JSON
    #[error("invalid json from backend")]
    Decode { details: String },
    /// Request never completed, or could not be handled at all
    #[error("{message}")]
    Transport {
        message: &'static str,
        details: Option<String>,
    },
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Auth(e) => e.status_code(),
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::Decode { .. } | ProxyError::Transport { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ProxyError::Auth(e) => e.error_response(),
            ProxyError::Upstream { status, body } => HttpResponse::build(*status).json(body),
            ProxyError::Decode { details } => HttpResponse::InternalServerError().json(json!({
                "error": "Invalid JSON from backend",
                "details": details,
            })),
            ProxyError::Transport { message, details: Some(details) } => {
                HttpResponse::InternalServerError().json(json!({
                    "error": message,
                    "details": details,
                }))
            }
            ProxyError::Transport { message, details: None } => {
                HttpResponse::InternalServerError().json(json!({ "error": message }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_all_map_to_401() {
        for error in [
            AuthError::InvalidCredentials,
            AuthError::BackendUnreachable,
            AuthError::NoSession,
            AuthError::MissingToken,
            AuthError::TokenExpired,
        ] {
            assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(ProxyError::from(error).status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_auth_errors_are_distinguishable_by_message() {
        assert!(AuthError::NoSession.to_string().contains("Not logged in"));
        assert!(AuthError::MissingToken.to_string().contains("Missing token"));
        assert!(AuthError::TokenExpired.to_string().contains("Token expired"));
    }

    #[test]
    fn test_upstream_keeps_backend_status() {
        let error = ProxyError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: json!({"error": "down"}),
        };
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.error_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_session_errors_are_500() {
        let error = SessionError::UnsupportedAlgorithm("RS256".into());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.to_string().contains("RS256"));
    }
}
