// web-server/src/api/mock.rs
//! Chart and table data; forwarded to the backend without authentication.
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::error::ProxyError;
use crate::proxy;
use crate::state::AppState;

const DEFAULT_POST_COUNT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    count: Option<String>,
}

impl PostsQuery {
    fn count(&self) -> u32 {
        self.count
            .as_deref()
            .and_then(|count| count.trim().parse().ok())
            .unwrap_or(DEFAULT_POST_COUNT)
    }
}

async fn forward(
    state: &AppState,
    path: &str,
    query: &[(&str, String)],
    failure: &'static str,
) -> Result<HttpResponse, ProxyError> {
    let result = state.backend.fetch_mock(path, query).await;
    let response = proxy::normalize_mock(result, failure)?;
    Ok(HttpResponse::build(response.status).json(response.body))
}

#[get("/posts")]
pub async fn posts(
    state: web::Data<AppState>,
    query: web::Query<PostsQuery>,
) -> Result<HttpResponse, ProxyError> {
    let count = query.count().to_string();
    forward(&state, "mock/posts", &[("count", count)], "Failed to fetch posts from backend").await
}

#[get("/coffee-consumption")]
pub async fn coffee_consumption(state: web::Data<AppState>) -> Result<HttpResponse, ProxyError> {
    forward(&state, "mock/coffee-consumption", &[], "Failed to fetch coffee brands from backend").await
}

#[get("/weekly-mood-trend")]
pub async fn weekly_mood_trend(state: web::Data<AppState>) -> Result<HttpResponse, ProxyError> {
    forward(&state, "mock/weekly-mood-trend", &[], "Failed to fetch the data from backend").await
}

#[get("/top-coffee-brands")]
pub async fn top_coffee_brands(state: web::Data<AppState>) -> Result<HttpResponse, ProxyError> {
    forward(&state, "mock/top-coffee-brands", &[], "Failed to fetch coffee brands from backend").await
}
