//! Cache handler over a remote store with tag and TTL indexes.
//!
//! Layout on the store, for a handler with prefix `p`:
//!
//! - `p<key>`: the serialized [`CacheEntry`], optionally with an absolute
//!   expiration
//! - `p__sharedTags__`: hash of cache key to JSON tag list
//! - `p__sharedTagsTtl__`: hash of cache key to expire-at (unix seconds)
//! - `p__revalidated_tags__`: hash of implicit tag to revalidation time
//!   (unix milliseconds)
//!
//! Explicit tags are invalidated eagerly by scanning the tag index. Implicit
//! tags are invalidated lazily: reads compare the entry's `last_modified`
//! against the markers of every tag in play.

mod sweep;

pub use sweep::RevalidationReport;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use vortex_cache_core::{
    CacheEntry, CacheError, Clock, GetContext, Result, SystemClock, combined_tags,
};
use vortex_cache_store::{RemoteStore, StoreError};

use crate::config::{HandlerConfig, KeyExpirationStrategy};
use crate::handler::CacheHandler;
use crate::keys::KeySpace;
use crate::metrics::HandlerMetrics;

/// Cache handler backed by a [`RemoteStore`].
pub struct TagIndexHandler {
    store: Arc<dyn RemoteStore>,
    config: HandlerConfig,
    keys: KeySpace,
    clock: Arc<dyn Clock>,
    metrics: HandlerMetrics,
    name: String,
}

impl TagIndexHandler {
    /// Creates a handler over `store`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidConfig` if the configuration does not
    /// validate.
    pub fn new(store: Arc<dyn RemoteStore>, config: HandlerConfig) -> Result<Self> {
        config.validate()?;

        let name = format!("tag-index:{}", store.name());
        Ok(Self {
            keys: KeySpace::new(&config),
            metrics: HandlerMetrics::new(name.clone()),
            clock: Arc::new(SystemClock),
            store,
            config,
            name,
        })
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    pub fn metrics(&self) -> &HandlerMetrics {
        &self.metrics
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.store.is_ready() {
            Ok(())
        } else {
            Err(CacheError::unavailable(format!(
                "store '{}' is not ready",
                self.store.name()
            )))
        }
    }

    /// Runs one store command under the configured deadline.
    async fn run<T, F>(&self, command: &'static str, op: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, StoreError>>,
    {
        let deadline = self.config.timeout();
        match tokio::time::timeout(deadline, op).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => {
                warn!(
                    command,
                    timeout_ms = deadline.as_millis() as u64,
                    "Store command timed out"
                );
                Err(CacheError::timeout(command, deadline))
            }
        }
    }

    async fn read(&self, key: &str, ctx: &GetContext) -> Result<Option<CacheEntry>> {
        self.ensure_ready()?;

        let entry_key = self.keys.entry(key);
        let fetched = self.run("GET", self.store.get(&entry_key)).await;
        let Some(raw) = self.degrade(key, fetched)?.flatten() else {
            self.metrics.record_miss();
            return Ok(None);
        };

        let entry = match CacheEntry::from_json(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key = %key, error = %e, "Discarding unreadable cache entry");
                self.metrics.record_miss();
                return Ok(None);
            }
        };

        let tags: Vec<String> = combined_tags(&entry.tags, &ctx.implicit_tags)
            .into_iter()
            .map(str::to_owned)
            .collect();

        if tags.is_empty() {
            self.metrics.record_hit();
            return Ok(Some(entry));
        }

        let markers = self
            .run("HMGET", self.store.hmget(self.keys.revalidated_tags(), &tags))
            .await;
        let Some(markers) = self.degrade(key, markers)? else {
            self.metrics.record_miss();
            return Ok(None);
        };

        let revalidated = markers
            .iter()
            .flatten()
            .filter_map(|marker| marker.parse::<u64>().ok())
            .any(|at| at > entry.last_modified);

        if revalidated {
            debug!(key = %key, "Entry was revalidated, discarding");
            self.metrics.record_stale();
            if let Err(e) = self
                .run("UNLINK", self.store.unlink(std::slice::from_ref(&entry_key)))
                .await
            {
                warn!(key = %key, error = %e, "Failed to unlink stale entry");
            }
            return Ok(None);
        }

        self.metrics.record_hit();
        Ok(Some(entry))
    }

    /// Turns a rejected read command into `None` so the caller can report a
    /// miss. Unavailable and timed out stores still fail the read.
    fn degrade<T>(&self, key: &str, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_store() => {
                warn!(key = %key, error = %e, "Read command failed, treating as a miss");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn write(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        self.ensure_ready()?;

        let payload = entry.to_json()?;
        let entry_key = self.keys.entry(key);
        let expire_at = entry.expire_at();

        let (payload_written, tags_written, ttl_written) = tokio::join!(
            self.write_payload(&entry_key, &payload, expire_at),
            self.write_tag_index(key, &entry.tags),
            self.write_ttl_index(key, !entry.tags.is_empty(), expire_at),
        );

        settle("set", [payload_written, tags_written, ttl_written])
    }

    async fn write_payload(&self, entry_key: &str, payload: &str, expire_at: Option<u64>) -> Result<()> {
        match (expire_at, self.config.key_expiration_strategy()) {
            (Some(at), KeyExpirationStrategy::Exat) => {
                self.run("SET", self.store.set(entry_key, payload, Some(at)))
                    .await
            }
            (Some(at), KeyExpirationStrategy::ExpireAt) => {
                self.run("SET", self.store.set(entry_key, payload, None))
                    .await?;
                self.run("EXPIREAT", self.store.expire_at(entry_key, at))
                    .await
                    .map(drop)
            }
            (None, _) => {
                self.run("SET", self.store.set(entry_key, payload, None))
                    .await
            }
        }
    }

    /// An untagged write clears whatever tag list an earlier write indexed.
    async fn write_tag_index(&self, key: &str, tags: &[String]) -> Result<()> {
        if tags.is_empty() {
            return self.clear_field(self.keys.shared_tags(), key).await;
        }

        let tags = serde_json::to_string(tags)?;
        self.run("HSET", self.store.hset(self.keys.shared_tags(), key, &tags))
            .await
    }

    /// Only tagged entries with a lifespan keep a TTL index field.
    async fn write_ttl_index(&self, key: &str, tagged: bool, expire_at: Option<u64>) -> Result<()> {
        match expire_at {
            Some(at) if tagged => {
                self.run(
                    "HSET",
                    self.store
                        .hset(self.keys.shared_tags_ttl(), key, &at.to_string()),
                )
                .await
            }
            _ => self.clear_field(self.keys.shared_tags_ttl(), key).await,
        }
    }

    async fn clear_field(&self, hash: &str, key: &str) -> Result<()> {
        self.run("HDEL", self.store.hdel(hash, &[key.to_string()]))
            .await
            .map(drop)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.ensure_ready()?;

        let entry_keys = [self.keys.entry(key)];
        let fields = [key.to_string()];

        let (unlinked, untagged, unindexed) = tokio::join!(
            self.run("UNLINK", self.store.unlink(&entry_keys)),
            self.run("HDEL", self.store.hdel(self.keys.shared_tags(), &fields)),
            self.run("HDEL", self.store.hdel(self.keys.shared_tags_ttl(), &fields)),
        );

        settle(
            "delete",
            [unlinked.map(drop), untagged.map(drop), unindexed.map(drop)],
        )
    }
}

/// Logs every failed sub-operation and returns the first failure.
fn settle<const N: usize>(operation: &'static str, results: [Result<()>; N]) -> Result<()> {
    let mut first = None;
    for result in results {
        if let Err(e) = result {
            warn!(operation, error = %e, "Sub-operation failed");
            first.get_or_insert(e);
        }
    }
    first.map_or(Ok(()), Err)
}

#[async_trait]
impl CacheHandler for TagIndexHandler {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(level = "debug", skip(self, ctx), fields(handler = %self.name))]
    async fn get(&self, key: &str, ctx: &GetContext) -> Result<Option<CacheEntry>> {
        let start = Instant::now();
        let result = self.read(key, ctx).await;
        self.metrics.record_operation_duration("get", start.elapsed());
        result
    }

    #[instrument(level = "debug", skip(self, entry), fields(handler = %self.name))]
    async fn set(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let start = Instant::now();
        let result = self.write(key, entry).await;
        self.metrics.record_operation_duration("set", start.elapsed());
        result
    }

    #[instrument(level = "debug", skip(self), fields(handler = %self.name))]
    async fn revalidate_tag(&self, tag: &str) -> Result<()> {
        let start = Instant::now();
        let result = self.revalidate(tag).await;
        self.metrics
            .record_operation_duration("revalidate_tag", start.elapsed());
        result.map(drop)
    }

    #[instrument(level = "debug", skip(self), fields(handler = %self.name))]
    async fn delete(&self, key: &str) -> Result<()> {
        let start = Instant::now();
        let result = self.remove(key).await;
        self.metrics
            .record_operation_duration("delete", start.elapsed());
        result
    }

    async fn health_check(&self) -> Result<()> {
        self.run("PING", self.store.ping()).await
    }
}

impl fmt::Debug for TagIndexHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagIndexHandler")
            .field("name", &self.name)
            .field("store", &self.store.name())
            .field("keys", &self.keys)
            .field("strategy", &self.config.key_expiration_strategy())
            .finish()
    }
}
