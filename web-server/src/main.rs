// Web Server - main.rs
use actix_web::{web, App, HttpServer};
use common::{setup_tracing, Config};
use std::io;
use std::sync::Arc;
use web_server::middleware::rate_limiter::RateLimiter;
use web_server::{api, AppState, HttpBackend};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load configuration
    let config = Config::from_env();

    // Setup tracing
    setup_tracing(&config.log_level);

    config
        .validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let backend = HttpBackend::new(&config.backend)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    // Save address before moving config into web::Data
    let server_addr = config.web_server_addr.clone();
    let debug_endpoints = config.debug_endpoints;
    let login_limiter = RateLimiter::new(&config.login_rate_limit);

    tracing::info!("Starting Web Server on {}", server_addr);
    tracing::info!("Proxying to backend at {}", config.backend.base_url);

    let state = AppState::new(config, Arc::new(backend))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let state = web::Data::new(state);

    HttpServer::new(move || {
        let login_limiter = login_limiter.clone();
        App::new()
            .app_data(state.clone())
            .configure(|cfg| api::configure(cfg, debug_endpoints, login_limiter))
    })
    .bind(&server_addr)?
    .run()
    .await
}
