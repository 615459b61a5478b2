//! Test helpers para vortex-cache-server.

#![allow(dead_code, unused_imports)]

pub mod app;
pub mod client;

pub use app::{NOW_MS, TestApp, test_app};
pub use client::{TestClient, TestResponse};
