//! Redis-backed store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Cmd, FromRedisValue, RedisError, RedisResult};
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info, warn};

use super::RedisStoreConfig;
use crate::error::StoreError;
use crate::traits::{RemoteStore, ScanPage};

/// A [`RemoteStore`] talking to Redis.
///
/// Commands share one multiplexed connection that reconnects on its own.
/// Readiness is tracked from command outcomes: a dropped or refused
/// connection marks the store as not ready, and any successful round-trip
/// (a command or a [`ping`](RemoteStore::ping)) marks it ready again. Since a
/// handler refuses to issue commands while the store is down, long-lived
/// processes should run [`spawn_readiness_probe`](RedisStore::spawn_readiness_probe).
pub struct RedisStore {
    manager: ConnectionManager,
    config: RedisStoreConfig,
    ready: AtomicBool,
}

impl RedisStore {
    /// Connects to Redis.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the URL is invalid or the server
    /// cannot be reached within the connect timeout.
    pub async fn connect(config: RedisStoreConfig) -> Result<Self, StoreError> {
        let client = Client::open(config.url()).map_err(|e| StoreError::connection(e.to_string()))?;

        let manager = tokio::time::timeout(config.connect_timeout(), ConnectionManager::new(client))
            .await
            .map_err(|_| {
                StoreError::connection(format!(
                    "timed out after {:?} connecting to {}",
                    config.connect_timeout(),
                    config.redacted_url()
                ))
            })?
            .map_err(|e| StoreError::connection(e.to_string()))?;

        info!("Connected to Redis at {}", config.redacted_url());

        Ok(Self {
            manager,
            config,
            ready: AtomicBool::new(true),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RedisStoreConfig {
        &self.config
    }

    /// Starts a background task that pings Redis while it is marked as not
    /// ready.
    ///
    /// Returns a handle that stops the task when dropped.
    pub fn spawn_readiness_probe(self: &Arc<Self>) -> ProbeHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(self);
        let period = store.config.probe_interval();

        tokio::spawn(async move {
            let mut timer = interval(period);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        if store.is_ready() {
                            continue;
                        }
                        match store.ping().await {
                            Ok(()) => info!("Redis store is ready again"),
                            Err(e) => debug!(error = %e, "Redis still unreachable"),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            debug!("Stopping Redis readiness probe");
                            break;
                        }
                    }
                }
            }
        });

        ProbeHandle { shutdown_tx }
    }

    async fn query<T: FromRedisValue>(&self, command: &'static str, cmd: &Cmd) -> Result<T, StoreError> {
        let mut conn = self.manager.clone();
        let result: RedisResult<T> = cmd.query_async(&mut conn).await;
        self.observe(command, result)
    }

    /// Updates readiness from a command outcome.
    fn observe<T>(&self, command: &'static str, result: RedisResult<T>) -> Result<T, StoreError> {
        match result {
            Ok(value) => {
                self.ready.store(true, Ordering::SeqCst);
                Ok(value)
            }
            Err(e) if is_connection_failure(&e) => {
                if self.ready.swap(false, Ordering::SeqCst) {
                    warn!(command, error = %e, "Lost connection to Redis");
                }
                Err(StoreError::connection(e.to_string()))
            }
            Err(e) => Err(StoreError::command(command, e.to_string())),
        }
    }
}

fn is_connection_failure(err: &RedisError) -> bool {
    err.is_connection_dropped() || err.is_connection_refusal() || err.is_io_error()
}

#[async_trait]
impl RemoteStore for RedisStore {
    fn name(&self) -> &str {
        "redis"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _: String = self.query("PING", &redis::cmd("PING")).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.query("GET", &cmd).await
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        expire_at: Option<u64>,
    ) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(at) = expire_at {
            cmd.arg("EXAT").arg(at);
        }
        self.query("SET", &cmd).await
    }

    async fn expire_at(&self, key: &str, timestamp: u64) -> Result<bool, StoreError> {
        let mut cmd = redis::cmd("EXPIREAT");
        cmd.arg(key).arg(timestamp);
        self.query("EXPIREAT", &cmd).await
    }

    async fn unlink(&self, keys: &[String]) -> Result<u64, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut cmd = redis::cmd("UNLINK");
        cmd.arg(keys);
        self.query("UNLINK", &cmd).await
    }

    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("HSET");
        cmd.arg(hash).arg(field).arg(value);
        self.query("HSET", &cmd).await
    }

    async fn hmget(
        &self,
        hash: &str,
        fields: &[String],
    ) -> Result<Vec<Option<String>>, StoreError> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        let mut cmd = redis::cmd("HMGET");
        cmd.arg(hash).arg(fields);
        self.query("HMGET", &cmd).await
    }

    async fn hdel(&self, hash: &str, fields: &[String]) -> Result<u64, StoreError> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut cmd = redis::cmd("HDEL");
        cmd.arg(hash).arg(fields);
        self.query("HDEL", &cmd).await
    }

    async fn hscan(
        &self,
        hash: &str,
        cursor: u64,
        count: usize,
    ) -> Result<ScanPage, StoreError> {
        let mut cmd = redis::cmd("HSCAN");
        cmd.arg(hash).arg(cursor).arg("COUNT").arg(count);
        let (cursor, flat): (u64, Vec<String>) = self.query("HSCAN", &cmd).await?;

        let entries = flat
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();

        Ok(ScanPage { cursor, entries })
    }

    async fn hdel_atomic(&self, hashes: &[String], fields: &[String]) -> Result<(), StoreError> {
        if fields.is_empty() || hashes.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for hash in hashes {
            pipe.cmd("HDEL").arg(hash).arg(fields).ignore();
        }

        let mut conn = self.manager.clone();
        let result: RedisResult<()> = pipe.query_async(&mut conn).await;
        self.observe("MULTI", result)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("url", &self.config.redacted_url())
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Handle for a running readiness probe.
pub struct ProbeHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl ProbeHandle {
    /// Signals the probe to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for ProbeHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
