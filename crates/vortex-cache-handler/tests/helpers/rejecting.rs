//! A store that rejects one command and forwards the rest.

use std::sync::Arc;

use async_trait::async_trait;
use vortex_cache_handler::vortex_cache_store::{MemoryStore, RemoteStore, ScanPage, StoreError};

pub struct RejectingStore {
    inner: Arc<MemoryStore>,
    rejected: &'static str,
}

impl RejectingStore {
    pub fn new(inner: Arc<MemoryStore>, rejected: &'static str) -> Self {
        Self { inner, rejected }
    }

    fn check(&self, command: &'static str) -> Result<(), StoreError> {
        if command == self.rejected {
            Err(StoreError::command(
                command,
                "WRONGTYPE Operation against a key holding the wrong kind of value",
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for RejectingStore {
    fn name(&self) -> &str {
        "rejecting"
    }

    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check("GET")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, expire_at: Option<u64>) -> Result<(), StoreError> {
        self.check("SET")?;
        self.inner.set(key, value, expire_at).await
    }

    async fn expire_at(&self, key: &str, timestamp: u64) -> Result<bool, StoreError> {
        self.check("EXPIREAT")?;
        self.inner.expire_at(key, timestamp).await
    }

    async fn unlink(&self, keys: &[String]) -> Result<u64, StoreError> {
        self.check("UNLINK")?;
        self.inner.unlink(keys).await
    }

    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.check("HSET")?;
        self.inner.hset(hash, field, value).await
    }

    async fn hmget(&self, hash: &str, fields: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        self.check("HMGET")?;
        self.inner.hmget(hash, fields).await
    }

    async fn hdel(&self, hash: &str, fields: &[String]) -> Result<u64, StoreError> {
        self.check("HDEL")?;
        self.inner.hdel(hash, fields).await
    }

    async fn hscan(&self, hash: &str, cursor: u64, count: usize) -> Result<ScanPage, StoreError> {
        self.check("HSCAN")?;
        self.inner.hscan(hash, cursor, count).await
    }

    async fn hdel_atomic(&self, hashes: &[String], fields: &[String]) -> Result<(), StoreError> {
        self.check("MULTI")?;
        self.inner.hdel_atomic(hashes, fields).await
    }
}
