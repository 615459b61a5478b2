//! Aplicacion de prueba sobre un store en memoria.

use std::sync::Arc;

use vortex_cache_core::{Clock, ManualClock};
use vortex_cache_handler::{CacheHandler, HandlerConfig, TagIndexHandler};
use vortex_cache_server::{AppState, create_router};
use vortex_cache_store::MemoryStore;

use super::client::TestClient;

/// 2023-11-14T22:13:20Z en milisegundos.
pub const NOW_MS: u64 = 1_700_000_000_000;

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub client: TestClient,
}

/// Router completo con un TagIndexHandler sobre MemoryStore y reloj manual.
pub fn test_app() -> TestApp {
    let clock = Arc::new(ManualClock::new(NOW_MS));
    let store = Arc::new(MemoryStore::new().with_clock(clock.clone()));
    let handler: Arc<dyn CacheHandler> = Arc::new(
        TagIndexHandler::new(store.clone(), HandlerConfig::default())
            .unwrap()
            .with_clock(clock.clone()),
    );

    let handle = vortex_cache_server::metrics::detached_handle().unwrap();
    let router = create_router(AppState::new(handler, store.clone()), handle);

    TestApp {
        store,
        clock,
        client: TestClient::new(router),
    }
}
