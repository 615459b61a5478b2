//! Vortex Cache Server binary.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vortex_cache_server::{AppState, ServerSettings, build_handler, connect_store, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ServerSettings::load().context("failed to load configuration")?;
    let addr = settings.addr()?;

    tracing::info!(
        "Starting Vortex Cache Server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        key_prefix = settings.handler.key_prefix(),
        strategy = %settings.handler.key_expiration_strategy(),
        timeout_ms = settings.handler.timeout().as_millis() as u64,
        "Handler configuration"
    );

    let prometheus_handle =
        vortex_cache_server::metrics::init_metrics().context("failed to initialize metrics")?;

    // Keep the probe alive for the lifetime of the server
    let connected = connect_store(&settings)
        .await
        .context("failed to connect to the cache store")?;
    let handler = build_handler(&settings, connected.store.clone())?;

    let state = AppState::new(handler, connected.store.clone());
    run_server(addr, state, prometheus_handle).await?;

    drop(connected);
    tracing::info!("Server stopped");
    Ok(())
}
