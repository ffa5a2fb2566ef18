// web-server/src/api/posts.rs
use actix_web::{get, post, web, HttpRequest, HttpResponse, ResponseError};
use common::token;
use serde::de::IgnoredAny;
use uuid::Uuid;

use super::{authorize_request, respond};
use crate::proxy;
use crate::state::AppState;

#[get("/posts")]
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn list_posts(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let (session, bearer) = match authorize_request(&req, &state) {
        Ok(authorized) => authorized,
        Err(e) => return e.error_response(),
    };
    tracing::debug!("Token retrieved from session: {}", token::preview(&bearer));

    let result = state.backend.list_posts(&bearer).await;
    respond(&state, &session, proxy::normalize_list(result))
}

#[post("/posts")]
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn create_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> HttpResponse {
    let (session, bearer) = match authorize_request(&req, &state) {
        Ok(authorized) => authorized,
        Err(e) => return e.error_response(),
    };

    if serde_json::from_slice::<IgnoredAny>(&body).is_err() {
        tracing::error!("Create post request body is not JSON");
        return respond(&state, &session, Err(proxy::create_failed()));
    }

    let result = state.backend.create_post(&bearer, body.to_vec()).await;
    respond(&state, &session, proxy::normalize_create(result))
}
