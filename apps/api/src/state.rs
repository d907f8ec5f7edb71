use crate::config::Config;
use crate::sessions::SessionRegistry;
use crate::store::SharedStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// One store for every session's records and the shared event log.
    pub store: SharedStore,
    pub sessions: SessionRegistry,
    pub config: Config,
}

impl AppState {
    pub fn new(store: SharedStore, config: Config) -> Self {
        Self {
            store,
            sessions: SessionRegistry::default(),
            config,
        }
    }
}
