// web-server/src/api/mod.rs
pub mod auth;
pub mod debug;
pub mod mock;
pub mod posts;

use actix_web::{get, web, HttpRequest, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::models::session::SessionCredential;
use serde_json::json;

use crate::error::{AuthError, ProxyError};
use crate::middleware::rate_limiter::RateLimiter;
use crate::proxy::{self, ProxyResponse};
use crate::state::AppState;

/// Register every route. `login_limiter` is shared across workers, so build it once.
pub fn configure(cfg: &mut web::ServiceConfig, debug_endpoints: bool, login_limiter: RateLimiter) {
    cfg.service(api_index)
        .service(
            web::resource("/auth/login")
                .app_data(auth::credential_config())
                .wrap(login_limiter)
                .route(web::post().to(auth::login)),
        )
        .service(auth::current_session)
        .service(posts::list_posts)
        .service(posts::create_post)
        .service(
            web::scope("/mock")
                .service(mock::posts)
                .service(mock::coffee_consumption)
                .service(mock::weekly_mood_trend)
                .service(mock::top_coffee_brands),
        );

    if debug_endpoints {
        tracing::warn!("Debug endpoints enabled");
        cfg.service(debug::debug_session);
    }
}

#[get("/")]
pub async fn api_index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "Dashboard API proxy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Resolve the caller's session and a fresh bearer token
fn authorize_request(
    req: &HttpRequest,
    state: &AppState,
) -> Result<(SessionCredential, String), AuthError> {
    proxy::authorize(state.sessions.from_request(req), Utc::now()).map_err(|e| {
        tracing::warn!(reason = e.reason(), "{} {} rejected: {}", req.method(), req.path(), e);
        e
    })
}

/// Render a proxied outcome and slide the session forward
fn respond(
    state: &AppState,
    session: &SessionCredential,
    outcome: Result<ProxyResponse, ProxyError>,
) -> HttpResponse {
    let mut response = match outcome {
        Ok(ProxyResponse { status, body }) => HttpResponse::build(status).json(body),
        Err(e) => e.error_response(),
    };

    match state.sessions.refresh(session) {
        Ok(cookie) => {
            if let Err(e) = response.add_cookie(&cookie) {
                tracing::warn!("Failed to attach refreshed session cookie: {}", e);
            }
        }
        Err(e) => tracing::warn!("Failed to refresh session: {}", e),
    }

    response
}
