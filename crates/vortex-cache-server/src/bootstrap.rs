//! Construccion del store y de la cadena de handlers a partir de la configuracion.

use std::sync::Arc;

use tracing::info;
use vortex_cache_core::{CacheError, Result};
use vortex_cache_handler::{CacheHandler, CompositeHandler, LocalHandler, TagIndexHandler};
use vortex_cache_store::{MemoryStore, ProbeHandle, RedisStore, RedisStoreConfig, RemoteStore};

use crate::settings::{Placement, ServerSettings};

/// Store conectado mas su tarea de sondeo, si la tiene.
///
/// El sondeo se detiene al soltar el handle.
pub struct ConnectedStore {
    pub store: Arc<dyn RemoteStore>,
    pub probe: Option<ProbeHandle>,
}

/// Conecta a Redis si hay `redis_url`; si no, usa un store en memoria.
pub async fn connect_store(settings: &ServerSettings) -> Result<ConnectedStore> {
    let Some(url) = &settings.redis_url else {
        info!("No redis_url configured, using in-memory store");
        return Ok(ConnectedStore {
            store: Arc::new(MemoryStore::new()),
            probe: None,
        });
    };

    let config = RedisStoreConfig::builder()
        .url(url)
        .build()
        .map_err(CacheError::invalid_config)?;

    info!(url = %config.redacted_url(), "Connecting to Redis");
    let store = Arc::new(RedisStore::connect(config).await?);
    let probe = store.spawn_readiness_probe();

    Ok(ConnectedStore {
        store,
        probe: Some(probe),
    })
}

/// Construye el handler remoto y, si hay cache local, el compuesto
/// `[local, remoto]` con la politica de colocacion configurada.
pub fn build_handler(
    settings: &ServerSettings,
    store: Arc<dyn RemoteStore>,
) -> Result<Arc<dyn CacheHandler>> {
    let remote = TagIndexHandler::new(store, settings.handler.clone())?;

    let Some(local_settings) = &settings.local else {
        info!(handler = remote.name(), "Cache handler ready");
        return Ok(Arc::new(remote));
    };

    let local = LocalHandler::new(local_settings.handler_config(&settings.handler));
    let placement = local_settings.placement;

    let members: Vec<Arc<dyn CacheHandler>> = vec![Arc::new(local), Arc::new(remote)];
    let composite = CompositeHandler::new(members)?
        .with_set_strategy(move |entry| match placement {
            Placement::Local => 0,
            Placement::Remote => 1,
            Placement::TaggedRemote => usize::from(!entry.tags.is_empty()),
        });

    info!(
        handler = composite.name(),
        placement = ?placement,
        "Cache handler ready"
    );
    Ok(Arc::new(composite))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LocalSettings;

    #[tokio::test]
    async fn test_memory_store_without_redis_url() {
        let connected = connect_store(&ServerSettings::default()).await.unwrap();

        assert_eq!(connected.store.name(), "memory");
        assert!(connected.probe.is_none());
    }

    #[tokio::test]
    async fn test_invalid_redis_url() {
        let settings = ServerSettings {
            redis_url: Some("http://not-redis".to_string()),
            ..ServerSettings::default()
        };

        let err = connect_store(&settings).await.err().unwrap();
        assert!(err.is_invalid_config());
    }

    #[test]
    fn test_remote_only_handler() {
        let handler = build_handler(&ServerSettings::default(), Arc::new(MemoryStore::new())).unwrap();

        assert_eq!(handler.name(), "tag-index:memory");
    }

    #[test]
    fn test_composite_when_local_configured() {
        let settings = ServerSettings {
            local: Some(LocalSettings {
                max_capacity: 100,
                ttl_seconds: 60,
                placement: Placement::TaggedRemote,
            }),
            ..ServerSettings::default()
        };

        let handler = build_handler(&settings, Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(handler.name(), "composite[local,tag-index:memory]");
    }
}
