//! Key naming on the remote store.

use crate::config::HandlerConfig;

/// Resolved store key names for one handler.
///
/// Payload keys and the three index hashes carry the configured prefix.
/// Fields inside the Tag and TTL index hashes are plain cache keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
    shared_tags: String,
    shared_tags_ttl: String,
    revalidated_tags: String,
}

impl KeySpace {
    pub fn new(config: &HandlerConfig) -> Self {
        let prefix = config.key_prefix();
        Self {
            prefix: prefix.to_string(),
            shared_tags: format!("{prefix}{}", config.shared_tags_key()),
            shared_tags_ttl: format!("{prefix}{}", config.shared_tags_ttl_key()),
            revalidated_tags: format!("{prefix}{}", config.revalidated_tags_key()),
        }
    }

    /// Store key of the payload for `key`.
    pub fn entry(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    pub fn shared_tags(&self) -> &str {
        &self.shared_tags
    }

    pub fn shared_tags_ttl(&self) -> &str {
        &self.shared_tags_ttl
    }

    pub fn revalidated_tags(&self) -> &str {
        &self.revalidated_tags
    }

    /// The Tag and TTL index hashes, in that order.
    pub fn index_hashes(&self) -> [String; 2] {
        [self.shared_tags.clone(), self.shared_tags_ttl.clone()]
    }
}
