//! Handler configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vortex_cache_core::{CacheError, DEFAULT_IMPLICIT_TAG_PREFIX, Result, is_implicit_tag};

/// How payload keys get their absolute expiration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyExpirationStrategy {
    /// `SET key value EXAT ts` in a single command. Needs Redis 6.2+.
    #[serde(rename = "EXAT")]
    Exat,
    /// `SET key value` followed by `EXPIREAT key ts`. Works everywhere.
    #[default]
    #[serde(rename = "EXPIREAT")]
    ExpireAt,
}

impl FromStr for KeyExpirationStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "EXAT" => Ok(Self::Exat),
            "EXPIREAT" => Ok(Self::ExpireAt),
            other => Err(CacheError::invalid_config(format!(
                "unknown key expiration strategy: {other} (expected EXAT or EXPIREAT)"
            ))),
        }
    }
}

impl fmt::Display for KeyExpirationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exat => f.write_str("EXAT"),
            Self::ExpireAt => f.write_str("EXPIREAT"),
        }
    }
}

/// Configuration for a [`TagIndexHandler`](crate::TagIndexHandler).
///
/// Field names follow camelCase on the wire; snake_case aliases let the
/// same struct be filled from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerConfig {
    /// Prefix for payload keys and index hash names.
    #[serde(default, alias = "key_prefix")]
    key_prefix: String,

    /// Hash holding cache key -> tag list.
    #[serde(default = "default_shared_tags_key", alias = "shared_tags_key")]
    shared_tags_key: String,

    /// Hash holding cache key -> expire-at seconds.
    #[serde(default = "default_shared_tags_ttl_key", alias = "shared_tags_ttl_key")]
    shared_tags_ttl_key: String,

    /// Hash holding implicit tag -> revalidation time (ms).
    #[serde(
        default = "default_revalidated_tags_key",
        alias = "revalidated_tags_key"
    )]
    revalidated_tags_key: String,

    /// Expiration strategy for payload keys.
    #[serde(default, alias = "key_expiration_strategy")]
    key_expiration_strategy: KeyExpirationStrategy,

    /// Per-command timeout.
    #[serde(
        default = "default_timeout",
        rename = "timeoutMs",
        alias = "timeout_ms",
        with = "millis_serde"
    )]
    timeout: Duration,

    /// HSCAN page size used by revalidation sweeps.
    #[serde(
        default = "default_revalidate_tag_query_size",
        alias = "revalidate_tag_query_size"
    )]
    revalidate_tag_query_size: usize,

    /// Tags starting with this prefix are implicit.
    #[serde(default = "default_implicit_tag_prefix", alias = "implicit_tag_prefix")]
    implicit_tag_prefix: String,
}

fn default_shared_tags_key() -> String {
    "__sharedTags__".to_string()
}

fn default_shared_tags_ttl_key() -> String {
    "__sharedTagsTtl__".to_string()
}

fn default_revalidated_tags_key() -> String {
    "__revalidated_tags__".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_millis(5_000)
}

fn default_revalidate_tag_query_size() -> usize {
    10_000
}

fn default_implicit_tag_prefix() -> String {
    DEFAULT_IMPLICIT_TAG_PREFIX.to_string()
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            key_prefix: String::new(),
            shared_tags_key: default_shared_tags_key(),
            shared_tags_ttl_key: default_shared_tags_ttl_key(),
            revalidated_tags_key: default_revalidated_tags_key(),
            key_expiration_strategy: KeyExpirationStrategy::default(),
            timeout: default_timeout(),
            revalidate_tag_query_size: default_revalidate_tag_query_size(),
            implicit_tag_prefix: default_implicit_tag_prefix(),
        }
    }
}

impl HandlerConfig {
    /// Creates a new builder for HandlerConfig.
    pub fn builder() -> HandlerConfigBuilder {
        HandlerConfigBuilder::default()
    }

    /// Returns the key prefix.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Returns the tag index hash name (without prefix).
    pub fn shared_tags_key(&self) -> &str {
        &self.shared_tags_key
    }

    /// Returns the TTL index hash name (without prefix).
    pub fn shared_tags_ttl_key(&self) -> &str {
        &self.shared_tags_ttl_key
    }

    /// Returns the revalidation marker hash name (without prefix).
    pub fn revalidated_tags_key(&self) -> &str {
        &self.revalidated_tags_key
    }

    /// Returns the key expiration strategy.
    pub fn key_expiration_strategy(&self) -> KeyExpirationStrategy {
        self.key_expiration_strategy
    }

    /// Returns the per-command timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the HSCAN page size.
    pub fn revalidate_tag_query_size(&self) -> usize {
        self.revalidate_tag_query_size
    }

    /// Returns the implicit tag prefix.
    pub fn implicit_tag_prefix(&self) -> &str {
        &self.implicit_tag_prefix
    }

    /// Returns true if `tag` is an implicit tag.
    pub fn is_implicit_tag(&self, tag: &str) -> bool {
        is_implicit_tag(tag, &self.implicit_tag_prefix)
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidConfig` for a zero timeout or page size,
    /// and for empty or colliding index hash names.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(CacheError::invalid_config("timeoutMs must be greater than 0"));
        }

        if self.revalidate_tag_query_size == 0 {
            return Err(CacheError::invalid_config(
                "revalidateTagQuerySize must be greater than 0",
            ));
        }

        let hashes = [
            &self.shared_tags_key,
            &self.shared_tags_ttl_key,
            &self.revalidated_tags_key,
        ];

        if hashes.iter().any(|h| h.is_empty()) {
            return Err(CacheError::invalid_config("index hash names cannot be empty"));
        }

        if hashes[0] == hashes[1] || hashes[0] == hashes[2] || hashes[1] == hashes[2] {
            return Err(CacheError::invalid_config("index hash names must be distinct"));
        }

        Ok(())
    }
}

/// Builder for HandlerConfig.
#[derive(Debug, Default)]
pub struct HandlerConfigBuilder {
    key_prefix: Option<String>,
    shared_tags_key: Option<String>,
    shared_tags_ttl_key: Option<String>,
    revalidated_tags_key: Option<String>,
    key_expiration_strategy: Option<KeyExpirationStrategy>,
    timeout: Option<Duration>,
    revalidate_tag_query_size: Option<usize>,
    implicit_tag_prefix: Option<String>,
}

impl HandlerConfigBuilder {
    /// Sets the key prefix.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the tag index hash name.
    pub fn shared_tags_key(mut self, key: impl Into<String>) -> Self {
        self.shared_tags_key = Some(key.into());
        self
    }

    /// Sets the TTL index hash name.
    pub fn shared_tags_ttl_key(mut self, key: impl Into<String>) -> Self {
        self.shared_tags_ttl_key = Some(key.into());
        self
    }

    /// Sets the revalidation marker hash name.
    pub fn revalidated_tags_key(mut self, key: impl Into<String>) -> Self {
        self.revalidated_tags_key = Some(key.into());
        self
    }

    /// Sets the key expiration strategy.
    pub fn key_expiration_strategy(mut self, strategy: KeyExpirationStrategy) -> Self {
        self.key_expiration_strategy = Some(strategy);
        self
    }

    /// Sets the per-command timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the HSCAN page size.
    pub fn revalidate_tag_query_size(mut self, size: usize) -> Self {
        self.revalidate_tag_query_size = Some(size);
        self
    }

    /// Sets the implicit tag prefix.
    pub fn implicit_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.implicit_tag_prefix = Some(prefix.into());
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<HandlerConfig> {
        let config = HandlerConfig {
            key_prefix: self.key_prefix.unwrap_or_default(),
            shared_tags_key: self.shared_tags_key.unwrap_or_else(default_shared_tags_key),
            shared_tags_ttl_key: self
                .shared_tags_ttl_key
                .unwrap_or_else(default_shared_tags_ttl_key),
            revalidated_tags_key: self
                .revalidated_tags_key
                .unwrap_or_else(default_revalidated_tags_key),
            key_expiration_strategy: self.key_expiration_strategy.unwrap_or_default(),
            timeout: self.timeout.unwrap_or_else(default_timeout),
            revalidate_tag_query_size: self
                .revalidate_tag_query_size
                .unwrap_or_else(default_revalidate_tag_query_size),
            implicit_tag_prefix: self
                .implicit_tag_prefix
                .unwrap_or_else(default_implicit_tag_prefix),
        };

        config.validate()?;
        Ok(config)
    }
}

mod millis_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
