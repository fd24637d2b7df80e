//! Adaptive indexing subsystem
//!
//! Indexes are derived, in-memory-only state over one collection per type.
//!
//! # Design Principles
//!
//! - Derived state: indexes mirror the node list, never the source of truth
//! - Lazy: a path is indexed once it has been filtered on often enough, or
//!   immediately when sorted on
//! - Deterministic: BTreeMap iteration order, sorted positions
//!
//! # Invariants
//!
//! - An index is built at most once per (collection, path) until the
//!   collection re-syncs
//! - Build failures are non-fatal; the query proceeds unindexed
//! - Lookups return positions ascending (store order)

mod adaptive;
mod btree;
mod collection;
mod errors;

pub use adaptive::{AdaptiveIndexer, DEFAULT_INDEX_THRESHOLD};
pub use btree::{IndexKey, IndexTree, Position};
pub use collection::NodeCollection;
pub use errors::{IndexError, IndexErrorCode, IndexResult};
