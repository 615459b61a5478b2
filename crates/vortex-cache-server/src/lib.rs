//! Vortex Cache Server - HTTP service for the Vortex tag-indexed cache
//!
//! Exposes a [`CacheHandler`](vortex_cache_handler::CacheHandler) over HTTP:
//!
//! | route | operation |
//! |---|---|
//! | `GET /entries/{*key}?implicitTags=a,b` | read an entry |
//! | `PUT /entries/{*key}` | write an entry |
//! | `DELETE /entries/{*key}` | delete an entry |
//! | `POST /tags/{tag}/revalidate` | revalidate a tag |
//! | `GET /health` | store readiness |
//! | `GET /metrics` | Prometheus metrics |

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

pub use bootstrap::{ConnectedStore, build_handler, connect_store};
pub use error::AppError;
pub use server::{create_router, run_server};
pub use settings::{LocalSettings, Placement, ServerSettings};
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }
}
