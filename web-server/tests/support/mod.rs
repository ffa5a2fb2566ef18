// web-server/tests/support/mod.rs
#![allow(dead_code)]

use actix_web::cookie::Cookie;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use common::models::auth::Credential;
use common::models::session::SessionUser;
use common::Config;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use web_server::{AppState, BackendApi, TransportError, UpstreamResponse};

pub const SESSION_SECRET: &str = "integration-test-secret";

/// A backend call as the fake saw it
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login { email: String },
    ListPosts { bearer: String },
    CreatePost { bearer: String, body: Vec<u8> },
    FetchMock { path: String, query: Vec<(String, String)> },
}

/// Records every call and answers with a canned response
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    reply: Mutex<Option<Result<UpstreamResponse, String>>>,
}

impl FakeBackend {
    pub fn replying(status: u16, body: &str) -> Arc<Self> {
        let backend = Self::default();
        *backend.reply.lock().unwrap() = Some(Ok(UpstreamResponse {
            status,
            body: body.to_string(),
        }));
        Arc::new(backend)
    }

    pub fn unreachable() -> Arc<Self> {
        let backend = Self::default();
        *backend.reply.lock().unwrap() = Some(Err("connection refused".to_string()));
        Arc::new(backend)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<UpstreamResponse, TransportError> {
        self.calls.lock().unwrap().push(call);
        match self.reply.lock().unwrap().clone() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError(message)),
            None => Ok(UpstreamResponse { status: 200, body: "{}".to_string() }),
        }
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn login(&self, credential: &Credential) -> Result<UpstreamResponse, TransportError> {
        self.record(Call::Login { email: credential.email.clone() })
    }

    async fn list_posts(&self, bearer: &str) -> Result<UpstreamResponse, TransportError> {
        self.record(Call::ListPosts { bearer: bearer.to_string() })
    }

    async fn create_post(&self, bearer: &str, body: Vec<u8>) -> Result<UpstreamResponse, TransportError> {
        self.record(Call::CreatePost { bearer: bearer.to_string(), body })
    }

    async fn fetch_mock(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<UpstreamResponse, TransportError> {
        self.record(Call::FetchMock {
            path: path.to_string(),
            query: query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        })
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.session.secret = SESSION_SECRET.to_string();
    config.session.secure_cookie = false;
    config.login_rate_limit.max_attempts = 3;
    config
}

pub fn state_with(backend: Arc<FakeBackend>) -> AppState {
    AppState::new(test_config(), backend).unwrap()
}

/// A backend bearer token expiring `offset` from now
pub fn bearer_expiring_in(offset: Duration) -> String {
    encode(
        &Header::default(),
        &json!({"userId": "1", "email": "a@b.com", "exp": (Utc::now() + offset).timestamp()}),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

pub fn fresh_bearer() -> String {
    bearer_expiring_in(Duration::hours(1))
}

/// Session cookie as the server would have issued it
pub fn session_cookie(state: &AppState, bearer: Option<String>) -> Cookie<'static> {
    let user = SessionUser {
        id: Some("1".to_string()),
        email: Some("a@b.com".to_string()),
        name: None,
    };
    let session = state.sessions.attach(user, bearer);
    state.sessions.cookie(&session).unwrap()
}

pub fn json_body(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

/// Initialise the full route table over `$state`, debug routes on
macro_rules! init_app {
    ($state:expr) => {
        init_app!($state, true)
    };
    ($state:expr, $debug:expr) => {{
        let state = $state;
        let limiter = web_server::middleware::rate_limiter::RateLimiter::new(
            &state.config.login_rate_limit,
        );
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(|cfg| web_server::api::configure(cfg, $debug, limiter)),
        )
        .await
    }};
}
