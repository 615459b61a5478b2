//! Tag revalidation and index garbage collection.

use tracing::{debug, info};
use vortex_cache_core::Result;

use super::{TagIndexHandler, settle};

/// Outcome of one revalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevalidationReport {
    /// The revalidated tag.
    pub tag: String,
    /// Entries removed because they carried the tag.
    pub tagged: usize,
    /// Entries removed because their expiration had passed.
    pub expired: usize,
}

impl TagIndexHandler {
    /// Revalidates `tag` and garbage-collects expired index fields.
    ///
    /// Implicit tags get a revalidation marker first. Then two sweeps run
    /// concurrently:
    ///
    /// 1. Tag sweep: every key whose tag list contains `tag`
    /// 2. TTL sweep: every key whose expire-at is in the past
    ///
    /// Collected keys lose their payload and both index fields. Running it
    /// twice has the same effect as running it once.
    ///
    /// # Errors
    ///
    /// Any failing store command fails the call, after both sweeps settle.
    pub async fn revalidate(&self, tag: &str) -> Result<RevalidationReport> {
        self.ensure_ready()?;

        if self.config.is_implicit_tag(tag) {
            let now = self.clock.now_millis().to_string();
            self.run("HSET", self.store.hset(self.keys.revalidated_tags(), tag, &now))
                .await?;
            debug!(tag = %tag, marker = %now, "Recorded revalidation marker");
        }

        let (tagged, expired) = tokio::join!(self.sweep_tag(tag), self.sweep_expired());
        let report = RevalidationReport {
            tag: tag.to_string(),
            tagged: tagged?,
            expired: expired?,
        };

        info!(
            tag = %tag,
            tagged = report.tagged,
            expired = report.expired,
            "Tag revalidated"
        );

        Ok(report)
    }

    async fn sweep_tag(&self, tag: &str) -> Result<usize> {
        let keys = self
            .scan_index(self.keys.shared_tags(), |tags| {
                serde_json::from_str::<Vec<String>>(tags)
                    .map(|tags| tags.iter().any(|t| t == tag))
                    .unwrap_or(false)
            })
            .await?;

        self.purge("tag", keys).await
    }

    async fn sweep_expired(&self) -> Result<usize> {
        let now = self.clock.now_secs();
        let keys = self
            .scan_index(self.keys.shared_tags_ttl(), |expire_at| {
                expire_at.parse::<u64>().map_or(true, |at| at < now)
            })
            .await?;

        self.purge("ttl", keys).await
    }

    /// Walks `hash` page by page and returns the fields whose value matches.
    async fn scan_index<F>(&self, hash: &str, matches: F) -> Result<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        let count = self.config.revalidate_tag_query_size();
        let mut cursor = 0;
        let mut selected = Vec::new();

        loop {
            let page = self.run("HSCAN", self.store.hscan(hash, cursor, count)).await?;

            selected.extend(
                page.entries
                    .iter()
                    .filter(|(_, value)| matches(value))
                    .map(|(field, _)| field.clone()),
            );

            if page.is_last() {
                break;
            }
            cursor = page.cursor;
        }

        // HSCAN may return a field more than once
        selected.sort_unstable();
        selected.dedup();
        Ok(selected)
    }

    /// Removes payloads and both index fields for `keys`.
    async fn purge(&self, sweep: &'static str, keys: Vec<String>) -> Result<usize> {
        if keys.is_empty() {
            return Ok(0);
        }

        let entry_keys: Vec<String> = keys.iter().map(|key| self.keys.entry(key)).collect();
        let hashes = self.keys.index_hashes();

        let (unlinked, cleared) = tokio::join!(
            self.run("UNLINK", self.store.unlink(&entry_keys)),
            self.run("MULTI", self.store.hdel_atomic(&hashes, &keys)),
        );
        settle("purge", [unlinked.map(drop), cleared])?;

        debug!(sweep, count = keys.len(), "Purged index entries");
        self.metrics.record_swept(sweep, keys.len());
        Ok(keys.len())
    }
}
