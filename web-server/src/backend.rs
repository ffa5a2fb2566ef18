// web-server/src/backend.rs
use async_trait::async_trait;
use common::models::auth::Credential;
use common::BackendConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

use crate::error::TransportError;

/// Raw backend answer; interpretation happens in `proxy`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The upstream REST API the dashboard sits in front of
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credential: &Credential) -> Result<UpstreamResponse, TransportError>;

    /// `GET /posts` with the caller's bearer token
    async fn list_posts(&self, bearer: &str) -> Result<UpstreamResponse, TransportError>;

    /// `POST /posts`; `body` is forwarded byte for byte
    async fn create_post(&self, bearer: &str, body: Vec<u8>) -> Result<UpstreamResponse, TransportError>;

    /// Unauthenticated `GET` of a mock data route such as `mock/posts`
    async fn fetch_mock(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<UpstreamResponse, TransportError>;
}

/// `BackendApi` over HTTP
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<UpstreamResponse, TransportError> {
        let response = request
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(UpstreamResponse { status, body })
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn login(&self, credential: &Credential) -> Result<UpstreamResponse, TransportError> {
        self.send(self.client.post(self.url("auth/login")).json(credential)).await
    }

    async fn list_posts(&self, bearer: &str) -> Result<UpstreamResponse, TransportError> {
        let url = self.url("posts");
        tracing::debug!("Fetching from backend: {}", url);
        self.send(self.client.get(url).bearer_auth(bearer)).await
    }

    async fn create_post(&self, bearer: &str, body: Vec<u8>) -> Result<UpstreamResponse, TransportError> {
        self.send(self.client.post(self.url("posts")).bearer_auth(bearer).body(body)).await
    }

    async fn fetch_mock(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<UpstreamResponse, TransportError> {
        self.send(self.client.get(self.url(path)).query(query)).await
    }
}
