//! In-process cache handler.
//!
//! Meant as the fast first member of a [`CompositeHandler`](crate::CompositeHandler).
//! Entries live in a moka cache and are lost on restart. Implicit tag
//! markers live in a second cache with the same time-to-live, since no entry
//! they could hide outlives it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use vortex_cache_core::{
    CacheEntry, Clock, DEFAULT_IMPLICIT_TAG_PREFIX, GetContext, Result, SystemClock,
    combined_tags, is_implicit_tag,
};

use crate::handler::CacheHandler;
use crate::metrics::HandlerMetrics;

/// Configuration for [`LocalHandler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalHandlerConfig {
    /// Maximum number of entries.
    #[serde(default = "default_max_capacity", alias = "max_capacity")]
    pub max_capacity: u64,

    /// Upper bound on how long an entry stays in memory.
    #[serde(default = "default_ttl_seconds", alias = "ttl_seconds")]
    pub ttl_seconds: u64,

    /// Tags starting with this prefix are implicit.
    #[serde(default = "default_implicit_tag_prefix", alias = "implicit_tag_prefix")]
    pub implicit_tag_prefix: String,
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_ttl_seconds() -> u64 {
    300
}

fn default_implicit_tag_prefix() -> String {
    DEFAULT_IMPLICIT_TAG_PREFIX.to_string()
}

impl Default for LocalHandlerConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            ttl_seconds: default_ttl_seconds(),
            implicit_tag_prefix: default_implicit_tag_prefix(),
        }
    }
}

/// Cache handler over an in-process moka cache.
pub struct LocalHandler {
    entries: Cache<String, Arc<CacheEntry>>,
    revalidated: Cache<String, u64>,
    implicit_tag_prefix: String,
    clock: Arc<dyn Clock>,
    metrics: HandlerMetrics,
}

impl LocalHandler {
    pub fn new(config: LocalHandlerConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_seconds);
        let entries = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(ttl)
            .build();
        let revalidated = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            entries,
            revalidated,
            implicit_tag_prefix: config.implicit_tag_prefix,
            clock: Arc::new(SystemClock),
            metrics: HandlerMetrics::new("local"),
        }
    }

    /// Replaces the time source used for lifespans and markers.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn metrics(&self) -> &HandlerMetrics {
        &self.metrics
    }

    /// Approximate number of cached entries.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Number of implicit tag markers currently held.
    pub fn marker_count(&self) -> u64 {
        self.revalidated.entry_count()
    }

    async fn is_revalidated(&self, entry: &CacheEntry, ctx: &GetContext) -> bool {
        for tag in combined_tags(&entry.tags, &ctx.implicit_tags) {
            let marker = self.revalidated.get(tag).await;
            if marker.is_some_and(|at| at > entry.last_modified) {
                return true;
            }
        }
        false
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        entry
            .lifespan
            .is_some_and(|lifespan| lifespan.is_expired(self.clock.now_secs()))
    }
}

#[async_trait]
impl CacheHandler for LocalHandler {
    fn name(&self) -> &str {
        "local"
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn get(&self, key: &str, ctx: &GetContext) -> Result<Option<CacheEntry>> {
        let Some(entry) = self.entries.get(key).await else {
            self.metrics.record_miss();
            return Ok(None);
        };

        if self.is_expired(&entry) {
            self.entries.invalidate(key).await;
            self.metrics.record_miss();
            return Ok(None);
        }

        if self.is_revalidated(&entry, ctx).await {
            debug!(key = %key, "Local entry was revalidated, discarding");
            self.entries.invalidate(key).await;
            self.metrics.record_stale();
            return Ok(None);
        }

        self.metrics.record_hit();
        Ok(Some(CacheEntry::clone(&entry)))
    }

    async fn set(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        if self.is_expired(entry) {
            self.entries.invalidate(key).await;
            return Ok(());
        }

        self.entries
            .insert(key.to_string(), Arc::new(entry.clone()))
            .await;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn revalidate_tag(&self, tag: &str) -> Result<()> {
        if is_implicit_tag(tag, &self.implicit_tag_prefix) {
            self.revalidated
                .insert(tag.to_string(), self.clock.now_millis())
                .await;
        }

        let now = self.clock.now_secs();
        let doomed: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(_, entry)| {
                entry.has_tag(tag) || entry.lifespan.is_some_and(|l| l.is_expired(now))
            })
            .map(|(key, _)| key)
            .collect();

        for key in &doomed {
            self.entries.invalidate(key.as_str()).await;
        }

        self.metrics.record_swept("local", doomed.len());
        debug!(tag = %tag, removed = doomed.len(), "Local tag revalidated");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}

impl fmt::Debug for LocalHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalHandler")
            .field("entries", &self.entries.entry_count())
            .field("markers", &self.revalidated.entry_count())
            .finish()
    }
}
