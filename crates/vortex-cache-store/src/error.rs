//! Error types for remote stores.

use vortex_cache_core::CacheError;

/// Errors reported by a [`RemoteStore`](crate::RemoteStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store is not accepting commands.
    #[error("store is not ready")]
    NotReady,

    /// The connection to the store could not be established or was lost.
    #[error("connection error: {0}")]
    Connection(String),

    /// A command was rejected by the store.
    #[error("{command} failed: {reason}")]
    Command { command: String, reason: String },
}

impl StoreError {
    /// Creates a new connection error.
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection(reason.into())
    }

    /// Creates a new command error.
    pub fn command(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for CacheError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotReady => CacheError::unavailable("store is not ready"),
            StoreError::Connection(reason) => CacheError::unavailable(reason),
            StoreError::Command { command, reason } => CacheError::store(command, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(StoreError::NotReady.to_string(), "store is not ready");
        assert_eq!(
            StoreError::command("HSCAN", "WRONGTYPE").to_string(),
            "HSCAN failed: WRONGTYPE"
        );
    }

    #[test]
    fn test_conversion_into_cache_error() {
        let err: CacheError = StoreError::NotReady.into();
        assert!(err.is_unavailable());

        let err: CacheError = StoreError::connection("broken pipe").into();
        assert!(err.is_unavailable());

        let err: CacheError = StoreError::command("SET", "OOM").into();
        assert!(matches!(err, CacheError::Store { .. }));
    }
}
