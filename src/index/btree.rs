//! BTreeMap-based index structures
//!
//! Indexes use BTreeMap<IndexKey, Vec<Position>> for deterministic ordering.
//! Positions are always sorted ascending, so narrowed candidates keep store
//! order.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde_json::Value;

/// Position of a node inside its collection
pub type Position = usize;

/// Index key representing a scalar field value.
///
/// Integers and floats share the `Number` kind so `1` and `1.0` meet.
/// Ordering is deterministic: Bool < Number < String.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// Boolean value (false < true)
    Bool(bool),
    /// Number (f64 bits mapped to a total order)
    Number(u64),
    /// String value
    String(String),
}

impl IndexKey {
    pub fn from_bool(v: bool) -> Self {
        IndexKey::Bool(v)
    }

    /// Create a key from a number. NaN has no key.
    pub fn from_number(v: f64) -> Option<Self> {
        if v.is_nan() {
            return None;
        }
        // -0.0 and 0.0 compare equal, so they share a key
        let v = if v == 0.0 { 0.0 } else { v };
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits // Negative: flip all bits
        } else {
            bits ^ (1 << 63) // Positive: flip sign bit
        };
        Some(IndexKey::Number(ordered))
    }

    pub fn from_string(v: impl Into<String>) -> Self {
        IndexKey::String(v.into())
    }

    /// Create a key from a JSON scalar. Null, arrays and objects have none.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(IndexKey::from_bool(*b)),
            Value::Number(n) => n.as_f64().and_then(IndexKey::from_number),
            Value::String(s) => Some(IndexKey::from_string(s)),
            _ => None,
        }
    }

    /// Lowest key of this key's kind
    pub fn kind_min(&self) -> IndexKey {
        match self {
            IndexKey::Bool(_) => IndexKey::Bool(false),
            IndexKey::Number(_) => IndexKey::Number(0),
            IndexKey::String(_) => IndexKey::String(String::new()),
        }
    }

    /// Upper bound covering every key of this key's kind
    pub fn kind_max(&self) -> Bound<IndexKey> {
        match self {
            IndexKey::Bool(_) => Bound::Included(IndexKey::Bool(true)),
            IndexKey::Number(_) => Bound::Included(IndexKey::Number(u64::MAX)),
            IndexKey::String(_) => Bound::Unbounded,
        }
    }
}

/// A single field index using BTreeMap for deterministic ordering.
#[derive(Debug, Default, Clone)]
pub struct IndexTree {
    /// Maps key values to sorted lists of positions
    tree: BTreeMap<IndexKey, Vec<Position>>,
}

impl IndexTree {
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    /// Insert a position for a key, keeping positions sorted ascending.
    pub fn insert(&mut self, key: IndexKey, position: Position) {
        let positions = self.tree.entry(key).or_default();

        match positions.binary_search(&position) {
            Ok(_) => {} // Already exists
            Err(pos) => positions.insert(pos, position),
        }
    }

    /// Lookup all positions for an exact key match.
    pub fn lookup_eq(&self, key: &IndexKey) -> Vec<Position> {
        self.tree.get(key).cloned().unwrap_or_default()
    }

    /// Lookup positions in a key range.
    ///
    /// Returns positions sorted ascending without duplicates.
    pub fn lookup_range(&self, min: Bound<&IndexKey>, max: Bound<&IndexKey>) -> Vec<Position> {
        if let (Bound::Included(lo) | Bound::Excluded(lo), Bound::Included(hi) | Bound::Excluded(hi)) = (min, max) {
            let empty = lo > hi || (lo == hi && !matches!((min, max), (Bound::Included(_), Bound::Included(_))));
            if empty {
                return Vec::new();
            }
        }

        let mut result: Vec<Position> = self
            .tree
            .range::<IndexKey, _>((min, max))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();

        // A node may sit under several keys
        result.sort_unstable();
        result.dedup();
        result
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the number of distinct keys
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns the total number of positions
    pub fn entry_count(&self) -> usize {
        self.tree.values().map(|v| v.len()).sum()
    }
}
