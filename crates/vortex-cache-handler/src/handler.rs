//! Cache handler trait definition.

use async_trait::async_trait;
use vortex_cache_core::{CacheEntry, GetContext, Result};

/// A cache that understands tags.
///
/// Every handler stores [`CacheEntry`] values under string keys and supports
/// invalidating whole groups of entries by tag. Handlers are shared between
/// request tasks, so all operations take `&self`.
///
/// # Implementors
///
/// - `TagIndexHandler` - Entries in a remote store with tag and TTL indexes
/// - `LocalHandler` - In-process entries, lost on restart
/// - `CompositeHandler` - Fans operations out to several handlers
///
/// # Example
///
/// ```ignore
/// use vortex_cache_handler::{CacheHandler, TagIndexHandler};
///
/// let handler = TagIndexHandler::new(store, HandlerConfig::default())?;
/// handler.set("/blog", &entry).await?;
/// handler.revalidate_tag("posts").await?;
/// assert!(handler.get("/blog", &GetContext::default()).await?.is_none());
/// ```
#[async_trait]
pub trait CacheHandler: Send + Sync {
    /// Returns the name of this handler.
    ///
    /// This is used for logging and as the `handler` metric label.
    fn name(&self) -> &str;

    /// Reads an entry.
    ///
    /// # Arguments
    ///
    /// * `key` - The cache key
    /// * `ctx` - Request context carrying the implicit tags of the read
    ///
    /// # Returns
    ///
    /// `None` on a miss, when the stored value is unreadable, or when any
    /// explicit or implicit tag was revalidated after the entry was written.
    ///
    /// # Errors
    ///
    /// - `CacheError::Unavailable` if the backing store is not ready
    /// - `CacheError::Timeout` if a store command exceeds its deadline
    async fn get(&self, key: &str, ctx: &GetContext) -> Result<Option<CacheEntry>>;

    /// Writes an entry, replacing any previous value for `key`.
    async fn set(&self, key: &str, entry: &CacheEntry) -> Result<()>;

    /// Invalidates every entry carrying `tag`.
    ///
    /// Implicit tags are additionally recorded so that later reads naming
    /// them in their context see the revalidation.
    async fn revalidate_tag(&self, tag: &str) -> Result<()>;

    /// Removes one entry.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Checks that the handler can serve requests.
    ///
    /// The default implementation always succeeds.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
