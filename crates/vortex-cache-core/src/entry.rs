//! Cache entries and their lifespan.

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Expiration policy attached to a cache entry.
///
/// All timestamps are unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifespan {
    /// When the entry was produced.
    pub last_modified_at: u64,
    /// From this instant the entry should be regenerated by its owner.
    pub stale_at: u64,
    /// From this instant the entry no longer exists.
    pub expire_at: u64,
}

impl Lifespan {
    /// Creates a lifespan starting at `now_secs`.
    ///
    /// # Example
    ///
    /// ```
    /// use vortex_cache_core::Lifespan;
    ///
    /// let lifespan = Lifespan::new(1_000, 60, 3_600);
    /// assert_eq!(lifespan.stale_at, 1_060);
    /// assert_eq!(lifespan.expire_at, 4_600);
    /// ```
    pub fn new(now_secs: u64, revalidate_secs: u64, expire_age_secs: u64) -> Self {
        Self {
            last_modified_at: now_secs,
            stale_at: now_secs + revalidate_secs,
            expire_at: now_secs + expire_age_secs,
        }
    }

    /// Creates a lifespan that only carries an absolute expiration.
    pub fn expiring_at(expire_at: u64) -> Self {
        Self {
            last_modified_at: 0,
            stale_at: expire_at,
            expire_at,
        }
    }

    /// Returns true once `expire_at` has been reached.
    pub fn is_expired(&self, now_secs: u64) -> bool {
        now_secs >= self.expire_at
    }

    /// Returns true once `stale_at` has been reached.
    pub fn is_stale(&self, now_secs: u64) -> bool {
        now_secs >= self.stale_at
    }
}

/// A serialized cache entry as stored on the remote store.
///
/// The `value` is opaque to the engine; only `tags`, `last_modified` and
/// `lifespan` drive invalidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Payload produced by the host.
    pub value: serde_json::Value,
    /// Tags attached to the entry. Duplicates are tolerated.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Unix time in milliseconds when the entry was produced.
    pub last_modified: u64,
    /// Optional expiration policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifespan: Option<Lifespan>,
}

impl CacheEntry {
    /// Creates an untagged entry without lifespan.
    pub fn new(value: serde_json::Value, last_modified: u64) -> Self {
        Self {
            value,
            tags: Vec::new(),
            last_modified,
            lifespan: None,
        }
    }

    /// Sets the tags of the entry.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the lifespan of the entry.
    pub fn with_lifespan(mut self, lifespan: Lifespan) -> Self {
        self.lifespan = Some(lifespan);
        self
    }

    /// Returns the absolute expiration (seconds), if any.
    pub fn expire_at(&self) -> Option<u64> {
        self.lifespan.map(|l| l.expire_at)
    }

    /// Returns true if the entry carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Serializes the entry into its stored representation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a stored entry.
    ///
    /// Empty or malformed payloads produce [`CacheError::MalformedData`].
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(CacheError::malformed("empty payload"));
        }
        serde_json::from_str(raw).map_err(|e| CacheError::malformed(e.to_string()))
    }
}

/// Per-request context passed to `get`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetContext {
    /// Tags derived by the caller from the request identity.
    #[serde(default)]
    pub implicit_tags: Vec<String>,
}

impl GetContext {
    /// Creates a context with the given implicit tags.
    pub fn with_implicit_tags<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            implicit_tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = CacheEntry::new(json!({"html": "<p>hi</p>"}), 1_700_000_000_000)
            .with_tags(["posts"])
            .with_lifespan(Lifespan::new(1_700_000_000, 60, 120));

        let raw = entry.to_json().unwrap();
        assert!(raw.contains("\"lastModified\":1700000000000"));
        assert!(raw.contains("\"expireAt\":1700000120"));
        assert!(raw.contains("\"staleAt\":1700000060"));

        let parsed = CacheEntry::from_json(&raw).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_entry_without_lifespan_omits_field() {
        let entry = CacheEntry::new(json!(1), 5);
        let raw = entry.to_json().unwrap();

        assert!(!raw.contains("lifespan"));
        assert_eq!(entry.expire_at(), None);
    }

    #[test]
    fn test_missing_tags_default_to_empty() {
        let parsed = CacheEntry::from_json(r#"{"value":null,"lastModified":1}"#).unwrap();
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            CacheEntry::from_json(""),
            Err(CacheError::MalformedData(_))
        ));
        assert!(matches!(
            CacheEntry::from_json("{not json"),
            Err(CacheError::MalformedData(_))
        ));
        assert!(matches!(
            CacheEntry::from_json(r#"{"value":1}"#),
            Err(CacheError::MalformedData(_))
        ));
    }

    #[test]
    fn test_lifespan_boundaries() {
        let lifespan = Lifespan::new(100, 10, 20);

        assert!(!lifespan.is_stale(109));
        assert!(lifespan.is_stale(110));
        assert!(!lifespan.is_expired(119));
        assert!(lifespan.is_expired(120));
    }

    #[test]
    fn test_has_tag_with_duplicates() {
        let entry = CacheEntry::new(json!(null), 0).with_tags(["a", "a", "b"]);

        assert!(entry.has_tag("a"));
        assert!(entry.has_tag("b"));
        assert!(!entry.has_tag("c"));
    }
}
