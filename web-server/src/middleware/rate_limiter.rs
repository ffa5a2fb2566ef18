// web-server/src/middleware/rate_limiter.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Instant, Duration};
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{header, StatusCode},
    Error, ResponseError,
    HttpResponse
};
use common::RateLimitConfig;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
struct RateLimitExceeded {
    retry_after: u64,
}

impl fmt::Display for RateLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rate limit exceeded")
    }
}

impl ResponseError for RateLimitExceeded {
    fn status_code(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::TooManyRequests()
            .append_header((header::RETRY_AFTER, self.retry_after.to_string()))
            .json(json!({ "error": "Too many login attempts. Please try again later." }))
    }
}

/// Sliding-window limit per client IP for the routes it wraps
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    store: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_attempts,
            window: Duration::from_secs(config.window_secs),
            store: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn is_rate_limited(&self, ip: &str) -> bool {
        // A poisoned lock only means another worker panicked mid-update
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        // Drop attempts outside the window, and clients left with none
        store.retain(|_, hits| {
            hits.retain(|time| now.duration_since(*time) < self.window);
            !hits.is_empty()
        });

        let hits = store.entry(ip.to_string()).or_default();
        if hits.len() >= self.max_requests {
            true
        } else {
            hits.push(now);
            false
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimiterMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterMiddleware<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Socket peer only; forwarded headers are client controlled
        let ip = req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        if self.limiter.is_rate_limited(&ip) {
            tracing::warn!("Rate limit exceeded for IP: {}", ip);

            let retry_after = self.limiter.window.as_secs();
            return Box::pin(async move {
                Err(RateLimitExceeded { retry_after }.into())
            });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            fut.await
        })
    }
}
