//! Vortex Cache Core - Domain types
//!
//! This crate provides the foundational types for the Vortex tag-indexed
//! cache: stored entries, their lifespan, request context for reads, tag
//! helpers, time sources and the shared error type.

pub mod clock;
pub mod entry;
pub mod error;
pub mod tags;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, GetContext, Lifespan};
pub use error::{CacheError, Result};
pub use tags::{DEFAULT_IMPLICIT_TAG_PREFIX, combined_tags, is_implicit_tag};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
