// web-server/src/api/debug.rs
use actix_web::{get, web, HttpRequest, HttpResponse};
use common::token;
use serde_json::json;
use uuid::Uuid;

use crate::error::AuthError;
use crate::state::AppState;

/// Session introspection; only routed when `debug_endpoints` is on
#[get("/debug/session")]
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn debug_session(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AuthError> {
    let current = state.sessions.from_request(&req).ok_or(AuthError::NoSession)?;
    let bearer = current.bearer();
    let claims = bearer.and_then(token::decode);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Session debug info",
        "hasSession": true,
        "user": current.user,
        "sessionExpires": current.expires,
        "tokenPreview": bearer.map(token::preview).unwrap_or_else(|| "NO TOKEN".to_string()),
        "tokenSubject": claims.as_ref().and_then(|c| c.subject()),
        "decodedToken": claims,
        "expiresAt": bearer.and_then(token::expiry_time),
        "expired": bearer.map_or(true, token::is_expired),
    })))
}
