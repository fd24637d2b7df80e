//! Query executor
//!
//! Execution flow (strict order):
//! 1. Reject operations that cannot be evaluated
//! 2. Narrow candidates through whatever indexes the collection offers
//! 3. Evaluate the full predicate on every candidate
//! 4. Apply sort (if specified)
//! 5. Return all matches, or the first one for single lookups
//!
//! Index narrowing only ever removes non-matching nodes, so results are the
//! same with or without indexes.

use std::sync::Arc;

use tracing::debug;

use super::errors::{ExecutorError, ExecutorResult};
use super::filters::PredicateFilter;
use super::result::QueryOutput;
use super::sorter::ResultSorter;
use crate::compiler::{CompiledPredicate, Condition, PrimitiveOp, SortSpec};
use crate::node::Node;

/// A queryable set of nodes in store order.
///
/// This is the single-source extension point: an alternative backing
/// store only needs to hand out its nodes, and may offer candidate
/// positions for individual operations.
pub trait Collection {
    /// All nodes in store order
    fn nodes(&self) -> &[Arc<Node>];

    /// Ascending positions into [`Collection::nodes`] that may satisfy
    /// `op` at `path`, or `None` when the collection cannot narrow.
    ///
    /// Must include every matching position.
    fn candidates(&self, _path: &str, _op: &PrimitiveOp) -> Option<Vec<usize>> {
        None
    }
}

impl Collection for [Arc<Node>] {
    fn nodes(&self) -> &[Arc<Node>] {
        self
    }
}

impl Collection for Vec<Arc<Node>> {
    fn nodes(&self) -> &[Arc<Node>] {
        self
    }
}

/// Execution output with scan statistics
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub output: QueryOutput,
    /// Nodes the predicate was evaluated on
    pub scanned_count: usize,
    /// Whether an index narrowed the scan
    pub indexed: bool,
}

/// Query executor that evaluates compiled predicates over a collection
pub struct QueryExecutor<'a, C: Collection + ?Sized> {
    collection: &'a C,
}

impl<'a, C: Collection + ?Sized> QueryExecutor<'a, C> {
    /// Creates a new executor
    pub fn new(collection: &'a C) -> Self {
        Self { collection }
    }

    /// Executes a compiled predicate.
    ///
    /// Deterministic: same predicate + same nodes = same results. Without a
    /// sort, results keep store order.
    pub fn execute(
        &self,
        predicate: &CompiledPredicate,
        sort: Option<&SortSpec>,
        first_only: bool,
    ) -> ExecutorResult<ExecutionResult> {
        if let Some(op) = predicate.first_unknown() {
            return Err(ExecutorError::malformed_query(op));
        }

        let nodes = self.collection.nodes();
        let candidates = self.candidate_positions(predicate);
        let indexed = candidates.is_some();

        let (mut matched, scanned_count): (Vec<Arc<Node>>, usize) = match candidates {
            Some(positions) => {
                let matched = positions
                    .iter()
                    .filter_map(|&position| nodes.get(position))
                    .filter(|node| PredicateFilter::matches(node.body(), predicate))
                    .cloned()
                    .collect();
                (matched, positions.len())
            }
            None => {
                let matched = nodes
                    .iter()
                    .filter(|node| PredicateFilter::matches(node.body(), predicate))
                    .cloned()
                    .collect();
                (matched, nodes.len())
            }
        };

        if let Some(sort) = sort.filter(|s| !s.is_empty()) {
            ResultSorter::sort(&mut matched, sort);
        }

        debug!(
            scanned = scanned_count,
            matched = matched.len(),
            indexed,
            first_only,
            "executed query"
        );

        let output = if first_only {
            QueryOutput::One(matched.into_iter().next())
        } else {
            QueryOutput::Many(matched)
        };

        Ok(ExecutionResult {
            output,
            scanned_count,
            indexed,
        })
    }

    /// Intersection of every candidate set the collection can provide
    fn candidate_positions(&self, predicate: &CompiledPredicate) -> Option<Vec<usize>> {
        let mut narrowed: Option<Vec<usize>> = None;

        for condition in predicate.conditions() {
            let Condition::Ops(ops) = &condition.condition else {
                continue;
            };
            for op in ops {
                let Some(positions) = self.collection.candidates(&condition.path, op) else {
                    continue;
                };
                narrowed = Some(match narrowed {
                    None => positions,
                    Some(previous) => intersect_sorted(&previous, &positions),
                });
            }
        }

        narrowed
    }
}

fn intersect_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{FilterCompiler, FilterExpr};
    use crate::executor::ExecutorErrorCode;
    use crate::schema::{ObjectTypeDef, SchemaBuilder};
    use serde_json::{json, Value};

    fn node(id: &str, body: Value) -> Arc<Node> {
        let mut value = body;
        value["id"] = json!(id);
        value["internal"] = json!({ "type": "Test" });
        Arc::new(Node::from_json(value).unwrap())
    }

    fn nodes() -> Vec<Arc<Node>> {
        vec![
            node("0", json!({ "hair": 1, "name": "The Mad Max" })),
            node("1", json!({ "hair": 2, "name": "The Mad Wax" })),
            node("2", json!({ "hair": 0, "name": "The Mad Wax" })),
        ]
    }

    fn compile(filter: Value) -> CompiledPredicate {
        let registry = SchemaBuilder::new()
            .object_type(
                ObjectTypeDef::new("Test")
                    .node()
                    .field("hair", "Int")
                    .field("name", "String"),
            )
            .build()
            .unwrap();
        FilterCompiler::new(Arc::new(registry))
            .compile(&FilterExpr::from_json(&filter).unwrap(), "Test")
            .unwrap()
    }

    /// Narrows `hair` by equality only, standing in for an indexed store
    struct HairIndexed(Vec<Arc<Node>>);

    impl Collection for HairIndexed {
        fn nodes(&self) -> &[Arc<Node>] {
            &self.0
        }

        fn candidates(&self, path: &str, op: &PrimitiveOp) -> Option<Vec<usize>> {
            match (path, op) {
                ("hair", PrimitiveOp::Eq(value)) => Some(
                    self.0
                        .iter()
                        .enumerate()
                        .filter(|(_, n)| n.get("hair") == Some(value))
                        .map(|(i, _)| i)
                        .collect(),
                ),
                _ => None,
            }
        }
    }

    #[test]
    fn test_store_order_without_sort() {
        let nodes = nodes();
        let result = QueryExecutor::new(&nodes)
            .execute(&compile(json!({ "hair": { "lt": 2 } })), None, false)
            .unwrap();
        assert_eq!(result.output.ids(), vec!["0", "2"]);
        assert_eq!(result.scanned_count, 3);
        assert!(!result.indexed);
    }

    #[test]
    fn test_first_only_sorts_before_picking() {
        let nodes = nodes();
        let sort = SortSpec::new().asc("hair");
        let result = QueryExecutor::new(&nodes)
            .execute(&compile(json!({ "name": { "eq": "The Mad Wax" } })), Some(&sort), true)
            .unwrap();
        assert_eq!(result.output, QueryOutput::One(Some(Arc::clone(&nodes[2]))));
    }

    #[test]
    fn test_first_only_without_match() {
        let nodes = nodes();
        let result = QueryExecutor::new(&nodes)
            .execute(&compile(json!({ "hair": { "eq": 9 } })), None, true)
            .unwrap();
        assert_eq!(result.output, QueryOutput::One(None));
    }

    #[test]
    fn test_index_narrowing_matches_full_scan() {
        let indexed = HairIndexed(nodes());
        let predicate = compile(json!({ "hair": { "eq": 2 }, "name": { "glob": "*Wax" } }));

        let narrowed = QueryExecutor::new(&indexed).execute(&predicate, None, false).unwrap();
        let scanned = QueryExecutor::new(&indexed.0).execute(&predicate, None, false).unwrap();

        assert!(narrowed.indexed);
        assert_eq!(narrowed.scanned_count, 1);
        assert_eq!(narrowed.output, scanned.output);
        assert_eq!(narrowed.output.ids(), vec!["1"]);
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let nodes = nodes();
        let err = QueryExecutor::new(&nodes)
            .execute(&compile(json!({ "hair": { "near": 2 } })), None, false)
            .unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::NqMalformedQuery);
    }

    #[test]
    fn test_intersect_sorted() {
        assert_eq!(intersect_sorted(&[0, 2, 4, 6], &[1, 2, 6, 7]), vec![2, 6]);
        assert!(intersect_sorted(&[], &[1]).is_empty());
    }
}
