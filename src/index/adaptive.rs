//! Usage-driven index creation
//!
//! Every top-level path of a compiled predicate bumps a per-(type, path)
//! counter. Once a counter reaches the threshold, the queried collection
//! gets an index for that path unless it already has one; later queries
//! only read it. Sort paths are indexed immediately.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use super::collection::NodeCollection;
use crate::compiler::{CompiledPredicate, SortSpec};
use crate::observability::EngineMetrics;

/// Default number of uses after which a path is indexed
pub const DEFAULT_INDEX_THRESHOLD: u64 = 5;

/// Field-usage counters and index triggering
pub struct AdaptiveIndexer {
    threshold: u64,
    usage: Mutex<HashMap<(String, String), u64>>,
    metrics: Arc<EngineMetrics>,
}

impl AdaptiveIndexer {
    pub fn new(threshold: u64, metrics: Arc<EngineMetrics>) -> Self {
        Self {
            threshold,
            usage: Mutex::new(HashMap::new()),
            metrics,
        }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Counts the predicate's paths and builds the missing indexes of paths
    /// at or past the threshold. Returns the paths indexed by this call.
    pub fn record_usage(&self, collection: &mut NodeCollection, predicate: &CompiledPredicate) -> Vec<String> {
        let due: Vec<String> = {
            let mut usage = self.usage.lock();
            predicate
                .paths()
                .into_iter()
                .filter(|path| {
                    let count = usage
                        .entry((collection.type_name().to_string(), path.to_string()))
                        .or_insert(0);
                    *count += 1;
                    *count >= self.threshold
                })
                .map(str::to_string)
                .collect()
        };

        due.into_iter()
            .filter(|path| self.ensure_index(collection, path))
            .collect()
    }

    /// Indexes every sort path regardless of usage
    pub fn index_sort_fields(&self, collection: &mut NodeCollection, sort: &SortSpec) {
        for path in sort.paths() {
            self.ensure_index(collection, path);
        }
    }

    /// Current counter for a path
    pub fn usage(&self, type_name: &str, path: &str) -> u64 {
        self.usage
            .lock()
            .get(&(type_name.to_string(), path.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Clears every counter
    pub fn reset(&self) {
        self.usage.lock().clear();
    }

    /// Build failures are logged and counted, never propagated
    fn ensure_index(&self, collection: &mut NodeCollection, path: &str) -> bool {
        match collection.ensure_index(path) {
            Ok(true) => {
                self.metrics.increment_indexes_built();
                info!(type_name = collection.type_name(), path, "index built");
                true
            }
            Ok(false) => false,
            Err(e) => {
                self.metrics.increment_index_build_failures();
                warn!(type_name = collection.type_name(), path, error = %e, "index build failed, querying unindexed");
                false
            }
        }
    }
}
