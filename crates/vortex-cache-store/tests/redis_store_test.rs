//! Integration tests against a live Redis.
//!
//! Run with `REDIS_URL=redis://localhost:6379 cargo test -- --ignored`.

use vortex_cache_store::{RedisStore, RedisStoreConfig, RemoteStore};

async fn connect() -> RedisStore {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let config = RedisStoreConfig::builder().url(url).build().unwrap();
    RedisStore::connect(config).await.expect("Redis must be reachable")
}

fn unique(name: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("vortex-test:{name}:{nanos}")
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn strings_round_trip_with_exat() {
    let store = connect().await;
    let key = unique("string");
    let far_future = 4_102_444_800; // 2100-01-01

    store.set(&key, "value", Some(far_future)).await.unwrap();
    assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("value"));

    assert_eq!(store.unlink(&[key.clone()]).await.unwrap(), 1);
    assert_eq!(store.get(&key).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn expire_at_in_the_past_removes_key() {
    let store = connect().await;
    let key = unique("expire");

    store.set(&key, "value", None).await.unwrap();
    assert!(store.expire_at(&key, 1).await.unwrap());
    assert_eq!(store.get(&key).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn hash_scan_and_atomic_delete() {
    let store = connect().await;
    let tags = unique("tags");
    let ttl = unique("ttl");

    for i in 0..30 {
        store.hset(&tags, &format!("k{i}"), "[\"t\"]").await.unwrap();
        store.hset(&ttl, &format!("k{i}"), "1").await.unwrap();
    }

    let mut cursor = 0;
    let mut fields = Vec::new();
    loop {
        let page = store.hscan(&tags, cursor, 7).await.unwrap();
        fields.extend(page.entries.into_iter().map(|(f, _)| f));
        cursor = page.cursor;
        if cursor == 0 {
            break;
        }
    }
    fields.sort();
    fields.dedup();
    assert_eq!(fields.len(), 30);

    store
        .hdel_atomic(&[tags.clone(), ttl.clone()], &fields)
        .await
        .unwrap();

    let left = store.hmget(&tags, &fields[..2]).await.unwrap();
    assert_eq!(left, vec![None, None]);
    assert!(store.hscan(&ttl, 0, 100).await.unwrap().entries.is_empty());
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn ping_keeps_store_ready() {
    let store = connect().await;

    store.ping().await.unwrap();
    assert!(store.is_ready());
}
