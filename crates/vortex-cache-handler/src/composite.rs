//! Composition of several cache handlers.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};
use vortex_cache_core::{CacheEntry, CacheError, GetContext, Result};

use crate::handler::CacheHandler;

/// Picks the member that receives a write, by index.
pub type SetStrategy = Arc<dyn Fn(&CacheEntry) -> usize + Send + Sync>;

/// A handler that fans operations out to an ordered list of members.
///
/// - Reads try members in order and return the first hit.
/// - Writes go to exactly one member, chosen by the [`SetStrategy`]
///   (the first member when none is set).
/// - Revalidations and deletes go to every member at once.
pub struct CompositeHandler {
    handlers: Vec<Arc<dyn CacheHandler>>,
    set_strategy: Option<SetStrategy>,
    name: String,
}

impl CompositeHandler {
    /// Creates a composite over `handlers`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidConfig` with fewer than two members.
    pub fn new(handlers: Vec<Arc<dyn CacheHandler>>) -> Result<Self> {
        if handlers.len() < 2 {
            return Err(CacheError::invalid_config(format!(
                "composite handler needs at least 2 handlers, got {}",
                handlers.len()
            )));
        }

        let members: Vec<&str> = handlers.iter().map(|h| h.name()).collect();
        let name = format!("composite[{}]", members.join(","));

        Ok(Self {
            handlers,
            set_strategy: None,
            name,
        })
    }

    /// Sets the write placement policy.
    pub fn with_set_strategy<F>(mut self, strategy: F) -> Self
    where
        F: Fn(&CacheEntry) -> usize + Send + Sync + 'static,
    {
        self.set_strategy = Some(Arc::new(strategy));
        self
    }

    /// Returns the members in order.
    pub fn handlers(&self) -> &[Arc<dyn CacheHandler>] {
        &self.handlers
    }

    fn placement(&self, entry: &CacheEntry) -> usize {
        let Some(strategy) = &self.set_strategy else {
            return 0;
        };

        let index = strategy(entry);
        if index < self.handlers.len() {
            index
        } else {
            warn!(
                index,
                members = self.handlers.len(),
                "Set strategy returned an out-of-range index, using first handler"
            );
            0
        }
    }

    /// Fails only when every member failed.
    fn settle(&self, operation: &'static str, results: Vec<Result<()>>) -> Result<()> {
        let total = results.len();
        let mut failures = Vec::new();

        for (handler, result) in self.handlers.iter().zip(results) {
            if let Err(e) = result {
                warn!(operation, handler = handler.name(), error = %e, "Member operation failed");
                failures.push(e);
            }
        }

        if !failures.is_empty() && failures.len() == total {
            return Err(failures.swap_remove(0));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheHandler for CompositeHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str, ctx: &GetContext) -> Result<Option<CacheEntry>> {
        for handler in &self.handlers {
            if let Some(entry) = handler.get(key, ctx).await? {
                debug!(key = %key, handler = handler.name(), "Composite hit");
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    async fn set(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let index = self.placement(entry);
        self.handlers[index].set(key, entry).await
    }

    async fn revalidate_tag(&self, tag: &str) -> Result<()> {
        let results = join_all(self.handlers.iter().map(|h| h.revalidate_tag(tag))).await;
        self.settle("revalidate_tag", results)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let results = join_all(self.handlers.iter().map(|h| h.delete(key))).await;
        self.settle("delete", results)
    }

    async fn health_check(&self) -> Result<()> {
        let results = join_all(self.handlers.iter().map(|h| h.health_check())).await;
        results.into_iter().collect()
    }
}

impl fmt::Debug for CompositeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeHandler")
            .field("name", &self.name)
            .field("has_set_strategy", &self.set_strategy.is_some())
            .finish()
    }
}
