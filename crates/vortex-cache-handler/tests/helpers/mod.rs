//! Test helpers para vortex-cache-handler.

#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod recording;
pub mod rejecting;

pub use fixtures::*;
pub use recording::RecordingHandler;
pub use rejecting::RejectingStore;
