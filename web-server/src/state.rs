// web-server/src/state.rs
use common::Config;
use std::sync::Arc;

use crate::backend::BackendApi;
use crate::error::SessionError;
use crate::session::SessionStore;

/// Read-only state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub backend: Arc<dyn BackendApi>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn BackendApi>) -> Result<Self, SessionError> {
        let sessions = SessionStore::new(&config.session)?;
        Ok(Self {
            config,
            sessions,
            backend,
        })
    }
}
