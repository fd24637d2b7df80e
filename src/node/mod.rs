//! Node data model and store collaborator
//!
//! A node is a JSON object tagged with an `id`, a type name
//! (`internal.type`) and a content version (`internal.contentDigest`).
//!
//! # Invariants
//!
//! - Nodes are immutable once stored; materialization produces new snapshots
//! - The content digest changes iff the node's semantic content changed
//! - The store owns nodes; the engine only holds `Arc` handles

mod errors;
mod node;
mod path;
mod signal;
mod store;

pub use errors::{NodeError, NodeErrorCode, NodeResult};
pub use node::Node;
pub use path::{lookup, resolve, Slot};
pub use signal::StoreSignal;
pub use store::{MemoryNodeStore, NodeStore};
