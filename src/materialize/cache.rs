//! Resolution caches
//!
//! Two promise-memoizing maps:
//! - per node, keyed by (id, content version, required fields)
//! - per query, keyed by (type, node count, required fields)
//!
//! Entries hold the shared in-flight future, so concurrent requests for one
//! key await a single resolution. Entries are never mutated, only replaced
//! or dropped.
//!
//! The per-query cache trusts the node count to detect changes, which only
//! holds once content has settled: it is consulted in steady state, or
//! always for production deployments.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::info;

use super::errors::MaterializeResult;
use crate::compiler::RequiredFields;
use crate::node::Node;

/// Shared, possibly still pending, materialization
pub type SharedResolution<T> = Shared<BoxFuture<'static, MaterializeResult<T>>>;

/// Process build phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// Content may still change without a cache-clear signal
    Bootstrap,
    /// Content changes are always signalled
    SteadyState,
}

/// Per-node cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub id: String,
    pub version: String,
    pub fields: RequiredFields,
}

impl NodeKey {
    pub fn new(node: &Node, fields: &RequiredFields) -> Self {
        Self {
            id: node.id().to_string(),
            version: node.content_digest().to_string(),
            fields: fields.clone(),
        }
    }
}

/// Per-query cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub type_name: String,
    pub node_count: usize,
    pub fields: RequiredFields,
}

struct PromiseMap<K, T: Clone> {
    entries: Mutex<HashMap<K, SharedResolution<T>>>,
}

impl<K: Eq + Hash, T: Clone> PromiseMap<K, T> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the entry for `key`, creating it with `make` when missing.
    /// The flag is true for an existing entry.
    fn get_or_insert<F>(&self, key: K, make: F) -> (SharedResolution<T>, bool)
    where
        F: FnOnce() -> BoxFuture<'static, MaterializeResult<T>>,
    {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&key) {
            return (existing.clone(), true);
        }
        let shared = make().shared();
        entries.insert(key, shared.clone());
        (shared, false)
    }

    /// Removes `key` only while it still maps to `expected`; a newer entry
    /// inserted after an earlier eviction is kept.
    fn remove_if_same(&self, key: &K, expected: &SharedResolution<T>) -> bool {
        let mut entries = self.entries.lock();
        let same = entries
            .get(key)
            .map_or(false, |current| current.ptr_eq(expected));
        if same {
            entries.remove(key);
        }
        same
    }

    fn retain(&self, keep: impl FnMut(&K, &mut SharedResolution<T>) -> bool) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(keep);
        before - entries.len()
    }

    fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let dropped = entries.len();
        entries.clear();
        dropped
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Node-level and query-level resolution caches plus the build phase
pub struct ResolutionCache {
    nodes: PromiseMap<NodeKey, Arc<Node>>,
    queries: PromiseMap<QueryKey, Vec<Arc<Node>>>,
    steady_state: AtomicBool,
    production: bool,
    node_cache_enabled: bool,
    query_cache_enabled: bool,
}

impl ResolutionCache {
    /// Creates empty caches in the bootstrap phase
    pub fn new(production: bool) -> Self {
        Self {
            nodes: PromiseMap::new(),
            queries: PromiseMap::new(),
            steady_state: AtomicBool::new(false),
            production,
            node_cache_enabled: true,
            query_cache_enabled: true,
        }
    }

    pub fn with_node_cache(mut self, enabled: bool) -> Self {
        self.node_cache_enabled = enabled;
        self
    }

    pub fn with_query_cache(mut self, enabled: bool) -> Self {
        self.query_cache_enabled = enabled;
        self
    }

    pub fn phase(&self) -> BuildPhase {
        if self.steady_state.load(Ordering::Acquire) {
            BuildPhase::SteadyState
        } else {
            BuildPhase::Bootstrap
        }
    }

    /// Switches to steady state
    pub fn finish_bootstrap(&self) {
        self.steady_state.store(true, Ordering::Release);
    }

    pub fn node_cache_enabled(&self) -> bool {
        self.node_cache_enabled
    }

    /// Whether whole-query results may be served from cache right now
    pub fn query_cache_active(&self) -> bool {
        self.query_cache_enabled && (self.production || self.phase() == BuildPhase::SteadyState)
    }

    pub(crate) fn node_entry<F>(&self, key: NodeKey, make: F) -> (SharedResolution<Arc<Node>>, bool)
    where
        F: FnOnce() -> BoxFuture<'static, MaterializeResult<Arc<Node>>>,
    {
        self.nodes.get_or_insert(key, make)
    }

    pub(crate) fn query_entry<F>(&self, key: QueryKey, make: F) -> (SharedResolution<Vec<Arc<Node>>>, bool)
    where
        F: FnOnce() -> BoxFuture<'static, MaterializeResult<Vec<Arc<Node>>>>,
    {
        self.queries.get_or_insert(key, make)
    }

    /// Drops a failed node entry so the next request retries.
    ///
    /// Returns false when `failed` is no longer the cached entry.
    pub(crate) fn evict_node(&self, key: &NodeKey, failed: &SharedResolution<Arc<Node>>) -> bool {
        self.nodes.remove_if_same(key, failed)
    }

    /// Drops a failed query entry so the next request retries
    pub(crate) fn evict_query(&self, key: &QueryKey, failed: &SharedResolution<Vec<Arc<Node>>>) -> bool {
        self.queries.remove_if_same(key, failed)
    }

    /// Empties both caches
    pub fn invalidate_all(&self) {
        let nodes = self.nodes.clear();
        let queries = self.queries.clear();
        info!(nodes, queries, "resolution caches cleared");
    }

    /// Drops node entries for `id` at any version other than `version`,
    /// and every query entry. Returns the number of node entries dropped.
    pub fn invalidate_by_version(&self, id: &str, version: &str) -> usize {
        let nodes = self
            .nodes
            .retain(|key, _| key.id != id || key.version == version);
        let queries = self.queries.clear();
        info!(id, version, nodes, queries, "resolution caches invalidated for node");
        nodes
    }

    /// Number of node-level entries
    pub fn node_entries(&self) -> usize {
        self.nodes.len()
    }

    /// Number of query-level entries
    pub fn query_entries(&self) -> usize {
        self.queries.len()
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(false)
    }
}
