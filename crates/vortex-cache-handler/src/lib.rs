//! # Vortex Cache Handler
//!
//! Tag-aware cache handlers.
//!
//! ## Features
//!
//! - [`TagIndexHandler`]: entries on a [`RemoteStore`](vortex_cache_store::RemoteStore),
//!   with a tag index for eager invalidation, a TTL index that keeps the tag
//!   index bounded, and revalidation markers for implicit tags
//! - [`LocalHandler`]: the same contract over an in-process moka cache
//! - [`CompositeHandler`]: reads through an ordered list of handlers and
//!   routes writes with a placement policy
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vortex_cache_handler::{CacheHandler, HandlerConfig, TagIndexHandler};
//! use vortex_cache_store::MemoryStore;
//!
//! let handler = TagIndexHandler::new(Arc::new(MemoryStore::new()), HandlerConfig::default())?;
//! handler.set("/blog", &entry).await?;
//! handler.revalidate_tag("posts").await?;
//! ```

pub mod composite;
pub mod config;
pub mod handler;
pub mod keys;
pub mod local;
pub mod metrics;
pub mod tag_index;

// Re-exports
pub use composite::{CompositeHandler, SetStrategy};
pub use config::{HandlerConfig, HandlerConfigBuilder, KeyExpirationStrategy};
pub use handler::CacheHandler;
pub use keys::KeySpace;
pub use local::{LocalHandler, LocalHandlerConfig};
pub use metrics::{HandlerMetrics, register_handler_metrics};
pub use tag_index::{RevalidationReport, TagIndexHandler};

// Re-export lower layers for consumers
pub use vortex_cache_core;
pub use vortex_cache_store;
