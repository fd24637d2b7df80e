//! Engine metrics
//!
//! - Counters only, monotonic between explicit resets
//! - Thread-safe via relaxed atomics
//! - Shared by the indexer, the materializer and the engine

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of one engine instance
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Queries answered
    queries_executed: AtomicU64,
    /// Queries rejected with an error
    queries_rejected: AtomicU64,
    /// Indexes built on demand
    indexes_built: AtomicU64,
    /// Index builds abandoned
    index_build_failures: AtomicU64,
    /// Collection re-syncs; each rebuilds that collection's indexes
    collections_synced: AtomicU64,
    /// Resolver invocations
    resolver_invocations: AtomicU64,
    node_cache_hits: AtomicU64,
    node_cache_misses: AtomicU64,
    query_cache_hits: AtomicU64,
    query_cache_misses: AtomicU64,
    /// Full and per-version invalidations
    invalidations: AtomicU64,
}

impl EngineMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_indexes_built(&self) {
        self.indexes_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_index_build_failures(&self) {
        self.index_build_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_collections_synced(&self) {
        self.collections_synced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_resolver_invocations(&self) {
        self.resolver_invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_node_cache_hits(&self) {
        self.node_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_node_cache_misses(&self) {
        self.node_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_query_cache_hits(&self) {
        self.query_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_query_cache_misses(&self) {
        self.query_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_invalidations(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn resolver_invocations(&self) -> u64 {
        self.resolver_invocations.load(Ordering::Relaxed)
    }

    pub fn indexes_built(&self) -> u64 {
        self.indexes_built.load(Ordering::Relaxed)
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            indexes_built: self.indexes_built.load(Ordering::Relaxed),
            index_build_failures: self.index_build_failures.load(Ordering::Relaxed),
            collections_synced: self.collections_synced.load(Ordering::Relaxed),
            resolver_invocations: self.resolver_invocations.load(Ordering::Relaxed),
            node_cache_hits: self.node_cache_hits.load(Ordering::Relaxed),
            node_cache_misses: self.node_cache_misses.load(Ordering::Relaxed),
            query_cache_hits: self.query_cache_hits.load(Ordering::Relaxed),
            query_cache_misses: self.query_cache_misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }

    /// Current snapshot as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub indexes_built: u64,
    pub index_build_failures: u64,
    pub collections_synced: u64,
    pub resolver_invocations: u64,
    pub node_cache_hits: u64,
    pub node_cache_misses: u64,
    pub query_cache_hits: u64,
    pub query_cache_misses: u64,
    pub invalidations: u64,
}
