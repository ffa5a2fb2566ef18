// web-server/src/lib.rs
pub mod api;
pub mod backend;
pub mod error;
pub mod middleware;
pub mod proxy;
pub mod session;
pub mod state;

pub use backend::{BackendApi, HttpBackend, UpstreamResponse};
pub use error::{AuthError, ProxyError, TransportError};
pub use state::AppState;
