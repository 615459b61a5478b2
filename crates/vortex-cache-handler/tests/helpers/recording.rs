//! A handler that records calls and can be told to fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use vortex_cache_handler::CacheHandler;
use vortex_cache_handler::vortex_cache_core::{CacheEntry, CacheError, GetContext, Result};

pub struct RecordingHandler {
    name: String,
    entries: Mutex<HashMap<String, CacheEntry>>,
    failing: AtomicBool,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub revalidations: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl RecordingHandler {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            revalidations: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &str) -> Self {
        let handler = Self::new(name);
        handler.failing.store(true, Ordering::SeqCst);
        handler
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn insert(&self, key: &str, entry: CacheEntry) {
        self.entries.lock().insert(key.to_string(), entry);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CacheError::unavailable(format!("{} is down", self.name)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheHandler for RecordingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str, _ctx: &GetContext) -> Result<Option<CacheEntry>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.insert(key, entry.clone());
        Ok(())
    }

    async fn revalidate_tag(&self, tag: &str) -> Result<()> {
        self.revalidations.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.entries.lock().retain(|_, entry| !entry.has_tag(tag));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.entries.lock().remove(key);
        Ok(())
    }
}
