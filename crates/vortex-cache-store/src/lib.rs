//! # Vortex Cache Store
//!
//! Remote key/value store protocol used by the Vortex cache engine.
//!
//! The engine only needs a small command surface: string get/set with an
//! optional absolute expiration, unlink, a handful of hash commands, cursor
//! based hash scans and a transactional multi-hash delete. This crate defines
//! that surface as the [`RemoteStore`] trait and ships two implementations.
//!
//! ## Features
//!
//! - [`RedisStore`]: Redis through an auto-reconnecting multiplexed connection
//! - [`MemoryStore`]: in-process store with the same semantics, used for local
//!   development and as the test fake
//!
//! ## Example
//!
//! ```ignore
//! use vortex_cache_store::{RedisStore, RedisStoreConfig, RemoteStore};
//!
//! let config = RedisStoreConfig::builder()
//!     .url("redis://localhost:6379")
//!     .build()?;
//!
//! let store = RedisStore::connect(config).await?;
//! store.hset("__sharedTags__", "/blog", r#"["posts"]"#).await?;
//! ```

pub mod error;
pub mod memory;
pub mod redis_store;
pub mod traits;

// Re-exports
pub use error::StoreError;
pub use memory::MemoryStore;
pub use redis_store::{ProbeHandle, RedisStore, RedisStoreConfig};
pub use traits::{RemoteStore, ScanPage};

// Re-export vortex_cache_core for consumers
pub use vortex_cache_core;
