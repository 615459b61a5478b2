//! Store, clock and entry fixtures.

use std::sync::Arc;

use serde_json::json;
use vortex_cache_handler::vortex_cache_core::{CacheEntry, Clock, Lifespan, ManualClock};
use vortex_cache_handler::vortex_cache_store::MemoryStore;
use vortex_cache_handler::{HandlerConfig, TagIndexHandler};

/// 2023-11-14T22:13:20Z in milliseconds.
pub const NOW_MS: u64 = 1_700_000_000_000;
pub const NOW_SECS: u64 = NOW_MS / 1_000;

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub handler: TagIndexHandler,
}

/// Handler over a fresh memory store, both driven by the same manual clock.
pub fn fixture(config: HandlerConfig) -> Fixture {
    let clock = Arc::new(ManualClock::new(NOW_MS));
    let store = Arc::new(MemoryStore::new().with_clock(clock.clone()));
    let handler = TagIndexHandler::new(store.clone(), config)
        .unwrap()
        .with_clock(clock.clone());

    Fixture {
        store,
        clock,
        handler,
    }
}

pub fn default_fixture() -> Fixture {
    fixture(HandlerConfig::default())
}

/// Entry written "now" with the given tags.
pub fn tagged(clock: &ManualClock, tags: &[&str]) -> CacheEntry {
    CacheEntry::new(json!({"html": "<p>page</p>"}), clock.now_millis()).with_tags(tags.iter().copied())
}

/// Entry written "now" that expires `ttl_secs` from now.
pub fn expiring(clock: &ManualClock, tags: &[&str], ttl_secs: u64) -> CacheEntry {
    tagged(clock, tags).with_lifespan(Lifespan::new(clock.now_secs(), ttl_secs / 2, ttl_secs))
}
