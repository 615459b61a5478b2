//! In-process store with Redis semantics.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use vortex_cache_core::{Clock, SystemClock};

use crate::error::StoreError;
use crate::traits::{RemoteStore, ScanPage};

#[derive(Debug)]
struct StoredString {
    value: String,
    expire_at: Option<u64>,
}

#[derive(Debug, Default)]
struct Inner {
    strings: HashMap<String, StoredString>,
    hashes: HashMap<String, BTreeMap<String, String>>,
    /// Open HSCAN cursors, each pointing at the last field it returned.
    cursors: HashMap<u64, String>,
    last_cursor: u64,
}

impl Inner {
    /// Drops `key` if its expiration has passed and returns the live value.
    fn live_string(&mut self, key: &str, now_secs: u64) -> Option<&StoredString> {
        let expired = self
            .strings
            .get(key)
            .and_then(|s| s.expire_at)
            .is_some_and(|at| now_secs >= at);

        if expired {
            self.strings.remove(key);
            return None;
        }

        self.strings.get(key)
    }

    fn remove_fields(&mut self, hash: &str, fields: &[String]) -> u64 {
        let Some(map) = self.hashes.get_mut(hash) else {
            return 0;
        };

        let removed = fields
            .iter()
            .filter(|field| map.remove(field.as_str()).is_some())
            .count() as u64;

        if map.is_empty() {
            self.hashes.remove(hash);
        }

        removed
    }
}

/// A [`RemoteStore`] living entirely in process memory.
///
/// String keys expire at their `EXAT`/`EXPIREAT` second according to the
/// injected clock, hashes are scanned in field order with a cursor that
/// resumes after the last returned field, and `hdel_atomic` runs under a
/// single lock.
///
/// Besides local development it is the fake used across the test suites, so
/// it also exposes a few hooks: readiness toggling, artificial latency and a
/// per-command counter.
///
/// # Example
///
/// ```
/// use vortex_cache_store::{MemoryStore, RemoteStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::new();
/// store.set("page:/", "<html/>", None).await.unwrap();
/// assert_eq!(store.get("page:/").await.unwrap().as_deref(), Some("<html/>"));
/// # }
/// ```
pub struct MemoryStore {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    ready: AtomicBool,
    latency: Option<Duration>,
    issued: Mutex<HashMap<&'static str, usize>>,
}

impl MemoryStore {
    /// Creates an empty store using the system clock.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            clock: Arc::new(SystemClock),
            ready: AtomicBool::new(true),
            latency: None,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Uses the given clock for expirations.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Delays every command by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Marks the store as (not) ready.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Number of times `command` has been issued.
    pub fn issued(&self, command: &str) -> usize {
        self.issued.lock().get(command).copied().unwrap_or(0)
    }

    /// Returns true if the string key exists and has not expired.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now_secs();
        self.inner.lock().live_string(key, now).is_some()
    }

    /// Number of fields stored in `hash`.
    pub fn hlen(&self, hash: &str) -> usize {
        self.inner.lock().hashes.get(hash).map_or(0, BTreeMap::len)
    }

    /// Returns the value of a single hash field.
    pub fn hget(&self, hash: &str, field: &str) -> Option<String> {
        self.inner
            .lock()
            .hashes
            .get(hash)
            .and_then(|map| map.get(field).cloned())
    }

    /// Shared prologue of every command.
    async fn begin(&self, command: &'static str) -> Result<(), StoreError> {
        *self.issued.lock().entry(command).or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if !self.is_ready() {
            return Err(StoreError::NotReady);
        }

        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.begin("PING").await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.begin("GET").await?;
        let now = self.clock.now_secs();

        Ok(self
            .inner
            .lock()
            .live_string(key, now)
            .map(|s| s.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        expire_at: Option<u64>,
    ) -> Result<(), StoreError> {
        self.begin("SET").await?;

        self.inner.lock().strings.insert(
            key.to_string(),
            StoredString {
                value: value.to_string(),
                expire_at,
            },
        );

        Ok(())
    }

    async fn expire_at(&self, key: &str, timestamp: u64) -> Result<bool, StoreError> {
        self.begin("EXPIREAT").await?;
        let now = self.clock.now_secs();
        let mut inner = self.inner.lock();

        if inner.live_string(key, now).is_none() {
            return Ok(false);
        }

        // A timestamp in the past deletes the key right away.
        if timestamp <= now {
            inner.strings.remove(key);
        } else if let Some(stored) = inner.strings.get_mut(key) {
            stored.expire_at = Some(timestamp);
        }

        Ok(true)
    }

    async fn unlink(&self, keys: &[String]) -> Result<u64, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        self.begin("UNLINK").await?;
        let now = self.clock.now_secs();
        let mut inner = self.inner.lock();

        let mut removed = 0;
        for key in keys {
            if inner.live_string(key, now).is_some() {
                inner.strings.remove(key);
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.begin("HSET").await?;

        self.inner
            .lock()
            .hashes
            .entry(hash.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());

        Ok(())
    }

    async fn hmget(
        &self,
        hash: &str,
        fields: &[String],
    ) -> Result<Vec<Option<String>>, StoreError> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        self.begin("HMGET").await?;
        let inner = self.inner.lock();
        let map = inner.hashes.get(hash);

        Ok(fields
            .iter()
            .map(|field| map.and_then(|m| m.get(field).cloned()))
            .collect())
    }

    async fn hdel(&self, hash: &str, fields: &[String]) -> Result<u64, StoreError> {
        if fields.is_empty() {
            return Ok(0);
        }
        self.begin("HDEL").await?;

        Ok(self.inner.lock().remove_fields(hash, fields))
    }

    async fn hscan(
        &self,
        hash: &str,
        cursor: u64,
        count: usize,
    ) -> Result<ScanPage, StoreError> {
        self.begin("HSCAN").await?;
        let mut inner = self.inner.lock();

        let start = if cursor == 0 {
            Bound::Unbounded
        } else {
            match inner.cursors.remove(&cursor) {
                Some(last) => Bound::Excluded(last),
                None => return Ok(ScanPage::default()),
            }
        };

        let Some(map) = inner.hashes.get(hash) else {
            return Ok(ScanPage::default());
        };

        let mut fields = map.range::<String, _>((start, Bound::Unbounded));
        let entries: Vec<(String, String)> = fields
            .by_ref()
            .take(count.max(1))
            .map(|(f, v)| (f.clone(), v.clone()))
            .collect();
        let more = fields.next().is_some();

        let cursor = match entries.last() {
            Some((last, _)) if more => {
                let last = last.clone();
                inner.last_cursor += 1;
                let id = inner.last_cursor;
                inner.cursors.insert(id, last);
                id
            }
            _ => 0,
        };

        Ok(ScanPage { cursor, entries })
    }

    async fn hdel_atomic(&self, hashes: &[String], fields: &[String]) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }
        self.begin("MULTI").await?;
        let mut inner = self.inner.lock();

        for hash in hashes {
            inner.remove_fields(hash, fields);
        }

        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryStore")
            .field("strings", &inner.strings.len())
            .field("hashes", &inner.hashes.len())
            .field("ready", &self.is_ready())
            .finish()
    }
}
