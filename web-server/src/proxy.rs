// web-server/src/proxy.rs
//! Request authorization and backend response normalization for proxied routes.
//!
//! A proxied request moves through: session resolved, bearer token present,
//! bearer token fresh, backend called, response normalized. Any failed step
//! short-circuits into a `ProxyError`; nothing is retried.

use actix_web::http::StatusCode;
use chrono::{DateTime, Utc};
use common::models::session::SessionCredential;
use common::{token, truncate_chars};
use serde_json::{json, Value};

use crate::backend::UpstreamResponse;
use crate::error::{AuthError, ProxyError, TransportError};

/// Characters of an upstream body echoed back in `details`
pub const DETAILS_CHARS: usize = 200;
/// Characters of an upstream body written to the log
const LOG_CHARS: usize = 500;

/// A normalized successful backend answer
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Session, then bearer presence, then bearer freshness; in that order
pub fn authorize(
    session: Option<SessionCredential>,
    now: DateTime<Utc>,
) -> Result<(SessionCredential, String), AuthError> {
    let session = session.ok_or(AuthError::NoSession)?;

    let bearer = session.bearer().ok_or(AuthError::MissingToken)?.to_string();

    if token::is_expired_at(&bearer, now) {
        return Err(AuthError::TokenExpired);
    }

    Ok((session, bearer))
}

/// `GET /posts`
pub fn normalize_list(
    result: Result<UpstreamResponse, TransportError>,
) -> Result<ProxyResponse, ProxyError> {
    let upstream = result.map_err(|e| {
        tracing::error!("Error fetching posts: {}", e);
        ProxyError::Transport {
            message: "Failed to fetch posts",
            details: Some(e.0),
        }
    })?;

    tracing::debug!(
        "Backend raw response (first 200 chars): {}",
        truncate_chars(&upstream.body, DETAILS_CHARS)
    );

    let status = upstream_status(&upstream)?;

    if !upstream.is_success() {
        tracing::error!("Backend error response: {}", truncate_chars(&upstream.body, LOG_CHARS));
        let body = serde_json::from_str(&upstream.body).unwrap_or_else(|_| {
            json!({
                "error": "Backend returned non-JSON response",
                "details": truncate_chars(&upstream.body, DETAILS_CHARS),
                "status": upstream.status,
            })
        });
        return Err(ProxyError::Upstream { status, body });
    }

    let body: Value = serde_json::from_str(&upstream.body).map_err(|_| ProxyError::Decode {
        details: truncate_chars(&upstream.body, DETAILS_CHARS).to_string(),
    })?;

    match &body {
        Value::Array(posts) => tracing::info!("Successfully fetched {} posts", posts.len()),
        _ => tracing::info!("Successfully fetched posts (not an array)"),
    }

    Ok(ProxyResponse { status, body })
}

/// `POST /posts`
pub fn normalize_create(
    result: Result<UpstreamResponse, TransportError>,
) -> Result<ProxyResponse, ProxyError> {
    let upstream = result.map_err(|e| {
        tracing::error!("Error creating post: {}", e);
        create_failed()
    })?;

    let status = upstream_status(&upstream)?;

    let body: Value = serde_json::from_str(&upstream.body).map_err(|_| {
        tracing::error!(
            "Backend create response with status {} is not JSON: {}",
            upstream.status,
            truncate_chars(&upstream.body, LOG_CHARS)
        );
        create_failed()
    })?;

    if !upstream.is_success() {
        return Err(ProxyError::Upstream { status, body });
    }

    Ok(ProxyResponse { status, body })
}

/// Unauthenticated mock data routes; any failure collapses into `failure`
pub fn normalize_mock(
    result: Result<UpstreamResponse, TransportError>,
    failure: &'static str,
) -> Result<ProxyResponse, ProxyError> {
    let fail = || ProxyError::Transport {
        message: failure,
        details: None,
    };

    let upstream = result.map_err(|e| {
        tracing::error!("{}: {}", failure, e);
        fail()
    })?;

    if !upstream.is_success() {
        tracing::error!("{}: backend responded with status {}", failure, upstream.status);
        return Err(fail());
    }

    let body = serde_json::from_str(&upstream.body).map_err(|_| {
        tracing::error!("{}: backend response is not JSON", failure);
        fail()
    })?;

    Ok(ProxyResponse {
        status: StatusCode::OK,
        body,
    })
}

pub(crate) fn create_failed() -> ProxyError {
    ProxyError::Transport {
        message: "Failed to create post",
        details: None,
    }
}

fn upstream_status(upstream: &UpstreamResponse) -> Result<StatusCode, ProxyError> {
    StatusCode::from_u16(upstream.status).map_err(|_| ProxyError::Transport {
        message: "Backend returned an invalid status",
        details: Some(upstream.status.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use chrono::Duration;
    use common::models::session::SessionUser;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn upstream(status: u16, body: &str) -> Result<UpstreamResponse, TransportError> {
        Ok(UpstreamResponse { status, body: body.to_string() })
    }

    fn bearer_expiring_at(exp: DateTime<Utc>) -> String {
        encode(
            &Header::default(),
            &json!({"userId": "1", "exp": exp.timestamp()}),
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .unwrap()
    }

    fn session(bearer: Option<String>) -> SessionCredential {
        SessionCredential {
            user: SessionUser::default(),
            backend_token: bearer,
            expires: Utc::now() + Duration::days(1),
        }
    }

    #[test]
    fn test_authorize_order() {
        let now = Utc::now();

        assert_eq!(authorize(None, now).unwrap_err(), AuthError::NoSession);
        assert_eq!(authorize(Some(session(None)), now).unwrap_err(), AuthError::MissingToken);
        assert_eq!(
            authorize(Some(session(Some(String::new()))), now).unwrap_err(),
            AuthError::MissingToken
        );

        let stale = bearer_expiring_at(now - Duration::seconds(1));
        assert_eq!(authorize(Some(session(Some(stale))), now).unwrap_err(), AuthError::TokenExpired);

        let garbage = "not-a-token".to_string();
        assert_eq!(authorize(Some(session(Some(garbage))), now).unwrap_err(), AuthError::TokenExpired);

        let fresh = bearer_expiring_at(now + Duration::seconds(3600));
        let (_, bearer) = authorize(Some(session(Some(fresh.clone()))), now).unwrap();
        assert_eq!(bearer, fresh);
    }

    #[test]
    fn test_list_passes_json_through() {
        let response = normalize_list(upstream(200, r#"[{"id":"1","title":"x"}]"#)).unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!([{"id": "1", "title": "x"}]));
    }

    #[test]
    fn test_list_wraps_non_json_error() {
        let error = normalize_list(upstream(503, "service unavailable")).unwrap_err();

        match &error {
            ProxyError::Upstream { status, body } => {
                assert_eq!(*status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(
                    *body,
                    json!({
                        "error": "Backend returned non-JSON response",
                        "details": "service unavailable",
                        "status": 503,
                    })
                );
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_list_passes_json_error_through() {
        let error = normalize_list(upstream(403, r#"{"message":"forbidden"}"#)).unwrap_err();

        match error {
            ProxyError::Upstream { status, body } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(body, json!({"message": "forbidden"}));
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[test]
    fn test_list_truncates_details() {
        let long = "e".repeat(1000);

        match normalize_list(upstream(502, &long)).unwrap_err() {
            ProxyError::Upstream { body, .. } => {
                assert_eq!(body["details"].as_str().unwrap().len(), DETAILS_CHARS);
            }
            other => panic!("expected upstream error, got {:?}", other),
        }

        match normalize_list(upstream(200, &long)).unwrap_err() {
            ProxyError::Decode { details } => assert_eq!(details.len(), DETAILS_CHARS),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_list_bad_json_on_success_is_500() {
        let error = normalize_list(upstream(200, "<html>oops</html>")).unwrap_err();

        assert!(matches!(&error, ProxyError::Decode { details } if details == "<html>oops</html>"));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_list_transport_failure_is_500() {
        let error = normalize_list(Err(TransportError("connection refused".into()))).unwrap_err();

        assert!(matches!(error, ProxyError::Transport { message: "Failed to fetch posts", .. }));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_create_keeps_backend_status() {
        let response = normalize_create(upstream(201, r#"{"id":"9","title":"new"}"#)).unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body, json!({"id": "9", "title": "new"}));
    }

    #[test]
    fn test_create_passes_json_error_through() {
        match normalize_create(upstream(422, r#"{"error":"title required"}"#)).unwrap_err() {
            ProxyError::Upstream { status, body } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(body, json!({"error": "title required"}));
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_failures_collapse_to_500() {
        for result in [
            upstream(500, "boom"),
            upstream(201, "not json"),
            Err(TransportError("timed out".into())),
        ] {
            let error = normalize_create(result).unwrap_err();
            assert!(matches!(error, ProxyError::Transport { message: "Failed to create post", details: None }));
            assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_mock_failures_use_route_message() {
        let message = "Failed to fetch posts from backend";

        assert_eq!(
            normalize_mock(upstream(200, r#"{"a":1}"#), message).unwrap().body,
            json!({"a": 1})
        );
        for result in [upstream(404, "{}"), upstream(200, "nope"), Err(TransportError("down".into()))] {
            let error = normalize_mock(result, message).unwrap_err();
            assert!(matches!(error, ProxyError::Transport { message: m, .. } if m == message));
        }
    }
}
