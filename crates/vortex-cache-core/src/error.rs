//! Error types for Vortex Cache.
//!
//! This module defines the error hierarchy shared by the store, handler and
//! server crates. All errors implement `std::error::Error` via `thiserror`.
//!
//! # Error Handling Philosophy
//!
//! - Reads degrade to a miss whenever the failure does not mean the store is
//!   gone (malformed payloads, stale entries).
//! - Writes and revalidations propagate, because losing either one can leave
//!   stale data behind for good.
//!
//! # Example
//!
//! ```
//! use vortex_cache_core::{CacheError, Result};
//!
//! fn ensure_ready(ready: bool) -> Result<()> {
//!     if !ready {
//!         return Err(CacheError::unavailable("redis connection is closed"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(ensure_ready(false).unwrap_err().is_unavailable());
//! ```

use std::time::Duration;

use thiserror::Error;

/// Main error type for cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The remote store reported itself as not ready.
    #[error("cache store unavailable: {reason}")]
    Unavailable {
        /// Why the store is not usable.
        reason: String,
    },

    /// A remote command did not complete before its deadline.
    #[error("command {command} timed out after {millis}ms")]
    Timeout {
        /// Name of the remote command (GET, HSCAN, ...).
        command: String,
        /// Configured deadline in milliseconds.
        millis: u64,
    },

    /// A stored payload could not be deserialized.
    #[error("malformed cache data: {0}")]
    MalformedData(String),

    /// The handler or one of its collaborators was misconfigured.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An entry could not be serialized before writing.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A command was rejected or failed on the remote store.
    #[error("store command {command} failed: {reason}")]
    Store {
        /// Name of the remote command.
        command: String,
        /// Error reported by the store client.
        reason: String,
    },
}

impl CacheError {
    /// Creates an Unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a Timeout error for the given command and deadline.
    pub fn timeout(command: impl Into<String>, deadline: Duration) -> Self {
        Self::Timeout {
            command: command.into(),
            millis: deadline.as_millis() as u64,
        }
    }

    /// Creates a MalformedData error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedData(message.into())
    }

    /// Creates an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Creates a Store error.
    pub fn store(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Store {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the store was not ready.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Returns true if a command exceeded its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if this is a configuration error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }

    /// Returns true if the store rejected a command.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store { .. })
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

/// Type alias for Results with CacheError.
pub type Result<T> = std::result::Result<T, CacheError>;
