//! Redis implementation of the remote store protocol.

mod config;
mod store;

pub use config::{RedisStoreConfig, RedisStoreConfigBuilder};
pub use store::{ProbeHandle, RedisStore};
