use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::sync::Arc;
use tokio::runtime::Runtime;
use vortex_cache_handler::vortex_cache_core::{CacheEntry, GetContext};
use vortex_cache_handler::vortex_cache_store::MemoryStore;
use vortex_cache_handler::{
    CacheHandler, HandlerConfig, LocalHandler, LocalHandlerConfig, TagIndexHandler,
};

/// Crea una entrada de prueba con N tags
fn create_test_entry(num_tags: usize) -> CacheEntry {
    let tags: Vec<String> = (0..num_tags).map(|i| format!("tag-{i}")).collect();
    CacheEntry::new(serde_json::json!({"html": "<main>bench</main>"}), 1_700_000_000_000)
        .with_tags(tags)
}

fn tag_index_handler() -> TagIndexHandler {
    let store = Arc::new(MemoryStore::new());
    TagIndexHandler::new(store, HandlerConfig::default()).unwrap()
}

/// Benchmark: get (hit) variando el numero de tags a comprobar
fn bench_tag_index_get(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("tag_index_get");

    for num_tags in [0, 4, 32] {
        let handler = tag_index_handler();
        let ctx = GetContext::with_implicit_tags(["_N_T_/layout", "_N_T_/blog"]);
        rt.block_on(async {
            handler.set("/blog", &create_test_entry(num_tags)).await.unwrap();
        });

        group.bench_with_input(BenchmarkId::from_parameter(num_tags), &num_tags, |b, _| {
            b.to_async(&rt).iter(|| async {
                let result = handler.get("/blog", &ctx).await;
                std::hint::black_box(result)
            });
        });
    }

    group.finish();
}

/// Benchmark: revalidate sobre un indice de N entradas
fn bench_tag_index_revalidate(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("tag_index_revalidate");

    for size in [100, 1_000] {
        let handler = tag_index_handler();
        rt.block_on(async {
            for i in 0..size {
                handler
                    .set(&format!("/page/{i}"), &create_test_entry(3))
                    .await
                    .unwrap();
            }
        });

        // Revalida un tag que no existe: mide solo el barrido
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.to_async(&rt).iter(|| async {
                let result = handler.revalidate("missing").await;
                std::hint::black_box(result)
            });
        });
    }

    group.finish();
}

/// Benchmark: local get (hit)
fn bench_local_get_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let handler = LocalHandler::new(LocalHandlerConfig::default());
    let ctx = GetContext::default();

    rt.block_on(async {
        handler.set("/blog", &create_test_entry(4)).await.unwrap();
    });

    c.bench_function("local_get_hit", |b| {
        b.to_async(&rt).iter(|| async {
            let result = handler.get("/blog", &ctx).await;
            std::hint::black_box(result)
        });
    });
}

criterion_group!(
    benches,
    bench_tag_index_get,
    bench_tag_index_revalidate,
    bench_local_get_hit
);
criterion_main!(benches);
