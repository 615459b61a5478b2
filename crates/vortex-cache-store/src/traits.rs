//! Remote store trait definition.

use async_trait::async_trait;

use crate::error::StoreError;

/// One page of an `HSCAN` iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next call. `0` means the iteration is complete.
    pub cursor: u64,
    /// Field/value pairs of this page.
    pub entries: Vec<(String, String)>,
}

impl ScanPage {
    /// Returns true if no further pages follow.
    pub fn is_last(&self) -> bool {
        self.cursor == 0
    }
}

/// An ordered key/value store with hash-map and expiration primitives.
///
/// This is the full command surface the cache engine issues. Any store that
/// implements it (Redis, Valkey, the in-memory store used in tests) can back a
/// handler.
///
/// # Implementors
///
/// - `RedisStore` - Redis through a multiplexed, auto-reconnecting connection
/// - `MemoryStore` - In-process store with the same semantics
///
/// Commands carry no deadline of their own: the handler wraps every call in
/// its configured timeout.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns the name of this store, for logging.
    fn name(&self) -> &str;

    /// Returns whether the store currently accepts commands.
    fn is_ready(&self) -> bool;

    /// Round-trips to the store. Implementations use it to refresh readiness.
    async fn ping(&self) -> Result<(), StoreError>;

    /// `GET key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// `SET key value`, or `SET key value EXAT expire_at` when given.
    async fn set(&self, key: &str, value: &str, expire_at: Option<u64>)
    -> Result<(), StoreError>;

    /// `EXPIREAT key timestamp`. Returns false if the key does not exist.
    async fn expire_at(&self, key: &str, timestamp: u64) -> Result<bool, StoreError>;

    /// `UNLINK key...`. Returns the number of removed keys.
    async fn unlink(&self, keys: &[String]) -> Result<u64, StoreError>;

    /// `HSET hash field value`.
    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// `HMGET hash field...`, one slot per requested field.
    async fn hmget(&self, hash: &str, fields: &[String])
    -> Result<Vec<Option<String>>, StoreError>;

    /// `HDEL hash field...`. Returns the number of removed fields.
    async fn hdel(&self, hash: &str, fields: &[String]) -> Result<u64, StoreError>;

    /// `HSCAN hash cursor COUNT count`.
    async fn hscan(&self, hash: &str, cursor: u64, count: usize)
    -> Result<ScanPage, StoreError>;

    /// Removes `fields` from every hash in `hashes` inside one transaction
    /// (`MULTI` / `HDEL`... / `EXEC`).
    async fn hdel_atomic(&self, hashes: &[String], fields: &[String]) -> Result<(), StoreError>;
}
