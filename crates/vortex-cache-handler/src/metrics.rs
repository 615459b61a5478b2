//! Handler metrics recording.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de los handlers.
/// Llamar una vez al inicio, despues de instalar el recorder.
pub fn register_handler_metrics() {
    metrics::describe_counter!("vortex_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("vortex_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "vortex_cache_stale_total",
        "Entries discarded on read because one of their tags was revalidated"
    );
    metrics::describe_counter!(
        "vortex_cache_swept_total",
        "Entries removed by revalidation sweeps"
    );
    metrics::describe_histogram!(
        "vortex_cache_operation_seconds",
        "Time spent on handler operations"
    );
}

/// Recorder de metricas por handler.
/// Los contadores internos son atomicos; las series exportadas llevan la
/// etiqueta `handler`.
#[derive(Debug, Clone)]
pub struct HandlerMetrics {
    handler: String,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    stale: Arc<AtomicU64>,
}

impl HandlerMetrics {
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            stale: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("vortex_cache_hits_total", "handler" => self.handler.clone()).increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("vortex_cache_misses_total", "handler" => self.handler.clone()).increment(1);
    }

    /// Registra una entrada descartada por revalidacion.
    /// Tambien cuenta como miss.
    pub fn record_stale(&self) {
        self.stale.fetch_add(1, Ordering::Relaxed);
        counter!("vortex_cache_stale_total", "handler" => self.handler.clone()).increment(1);
        self.record_miss();
    }

    /// Registra entradas eliminadas por un barrido
    pub fn record_swept(&self, sweep: &'static str, count: usize) {
        counter!(
            "vortex_cache_swept_total",
            "handler" => self.handler.clone(),
            "sweep" => sweep
        )
        .increment(count as u64);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!(
            "vortex_cache_operation_seconds",
            "handler" => self.handler.clone(),
            "operation" => operation
        )
        .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn stale(&self) -> u64 {
        self.stale.load(Ordering::Relaxed)
    }
}
