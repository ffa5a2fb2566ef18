// web-server/src/api/auth.rs
use actix_web::error::JsonPayloadError;
use actix_web::{get, web, HttpRequest, HttpResponse};
use common::models::auth::Credential;
use common::models::session::SessionResponse;
use uuid::Uuid;

use crate::error::AuthError;
use crate::state::AppState;

/// Login bodies that are not usable JSON credentials are bad credentials
pub fn credential_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        tracing::warn!(reason = AuthError::InvalidCredentials.reason(), "Unreadable login body: {}", err);
        AuthError::InvalidCredentials.into()
    })
}

/// `POST /auth/login`, wrapped by the login rate limiter
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn login(
    state: web::Data<AppState>,
    credential: web::Json<Credential>,
) -> Result<HttpResponse, actix_web::Error> {
    let established = state
        .sessions
        .login(&credential, state.backend.as_ref())
        .await
        .map_err(|e| {
            tracing::warn!(reason = e.reason(), "Login failed");
            e
        })?;

    let cookie = state.sessions.cookie(&established)?;

    tracing::info!("Session established for {:?}", established.user.email);
    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(SessionResponse::from(&established)))
}

#[get("/auth/session")]
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn current_session(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let current = state
        .sessions
        .from_request(&req)
        .ok_or(AuthError::NoSession)?;

    let cookie = state.sessions.refresh(&current)?;

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(SessionResponse::from(&current)))
}
