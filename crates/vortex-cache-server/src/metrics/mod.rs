//! Metrics module for Vortex Cache Server.

pub mod http;
pub mod setup;

pub use setup::{detached_handle, init_metrics, register_metrics};
