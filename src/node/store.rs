//! Node store collaborator

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::node::Node;
use super::signal::StoreSignal;

/// Read access to stored nodes
pub trait NodeStore: Send + Sync {
    /// All nodes of a type in store (insertion) order
    fn nodes_by_type(&self, type_name: &str) -> Vec<Arc<Node>>;

    /// Looks up a node by id
    fn node(&self, id: &str) -> Option<Arc<Node>>;
}

/// In-memory node store keeping insertion order
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    nodes: Vec<Arc<Node>>,
    positions: HashMap<String, usize>,
}

impl MemoryNodeStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given nodes
    pub fn with_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let store = Self::new();
        for node in nodes {
            store.upsert(node);
        }
        store
    }

    /// Inserts or replaces a node.
    ///
    /// Replacement keeps the node's original position. Returns the signal the
    /// engine should receive for this change.
    pub fn upsert(&self, node: Node) -> StoreSignal {
        let signal = StoreSignal::NodeChanged {
            id: node.id().to_string(),
            content_digest: node.content_digest().to_string(),
        };

        let mut guard = self.inner.write();
        let StoreInner { nodes, positions } = &mut *guard;
        let node = Arc::new(node);
        match positions.get(node.id()).copied() {
            Some(pos) => nodes[pos] = node,
            None => {
                positions.insert(node.id().to_string(), nodes.len());
                nodes.push(node);
            }
        }

        signal
    }

    /// Removes a node by id, returning it if present
    pub fn remove(&self, id: &str) -> Option<Arc<Node>> {
        let mut guard = self.inner.write();
        let StoreInner { nodes, positions } = &mut *guard;
        let pos = positions.remove(id)?;
        let removed = nodes.remove(pos);
        for (i, node) in nodes.iter().enumerate().skip(pos) {
            positions.insert(node.id().to_string(), i);
        }
        Some(removed)
    }

    /// Number of stored nodes
    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// Returns true if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NodeStore for MemoryNodeStore {
    fn nodes_by_type(&self, type_name: &str) -> Vec<Arc<Node>> {
        self.inner
            .read()
            .nodes
            .iter()
            .filter(|n| n.type_name() == type_name)
            .cloned()
            .collect()
    }

    fn node(&self, id: &str) -> Option<Arc<Node>> {
        let inner = self.inner.read();
        inner.positions.get(id).map(|&pos| inner.nodes[pos].clone())
    }
}
