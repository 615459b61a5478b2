//! Application state.

use std::sync::Arc;

use vortex_cache_handler::CacheHandler;
use vortex_cache_store::RemoteStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The cache handler serving entry and tag operations.
    handler: Arc<dyn CacheHandler>,
    /// The remote store behind the handler, for readiness.
    store: Arc<dyn RemoteStore>,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(handler: Arc<dyn CacheHandler>, store: Arc<dyn RemoteStore>) -> Self {
        Self { handler, store }
    }

    /// Returns a reference to the cache handler.
    pub fn handler(&self) -> &dyn CacheHandler {
        self.handler.as_ref()
    }

    /// Returns a reference to the remote store.
    pub fn store(&self) -> &dyn RemoteStore {
        self.store.as_ref()
    }
}
