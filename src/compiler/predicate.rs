//! Compiled predicate representation
//!
//! A predicate is an ordered list of dotted-path conditions, all of which
//! must hold. Operators on the same path are merged into one condition.

use serde_json::Value;

use super::pattern::{GlobMatcher, RegexMatcher};

/// Primitive operation evaluated against the value at a path
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveOp {
    Eq(Value),
    Ne(Value),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    In(Vec<Value>),
    /// `exclude_absent` also rejects nodes lacking the field
    Nin { values: Vec<Value>, exclude_absent: bool },
    /// List holds the value
    Contains(Value),
    /// List shares at least one element with the values
    ContainsAny(Vec<Value>),
    /// List shares no element with the values
    ContainsNone(Vec<Value>),
    /// Present and matching; never matches an absent field
    Regex(RegexMatcher),
    Glob(GlobMatcher),
    /// Null or absent
    Missing,
    /// Present and not null
    Present,
    /// Anything but literal `true`, including missing intermediates
    NotTrue,
    /// Operator the compiler does not know; rejected by the executor
    Unknown { op: String, value: Value },
}

impl PrimitiveOp {
    pub fn name(&self) -> &str {
        match self {
            PrimitiveOp::Eq(_) => "$eq",
            PrimitiveOp::Ne(_) => "$ne",
            PrimitiveOp::Lt(_) => "$lt",
            PrimitiveOp::Lte(_) => "$lte",
            PrimitiveOp::Gt(_) => "$gt",
            PrimitiveOp::Gte(_) => "$gte",
            PrimitiveOp::In(_) => "$in",
            PrimitiveOp::Nin { .. } => "$nin",
            PrimitiveOp::Contains(_) => "$contains",
            PrimitiveOp::ContainsAny(_) => "$containsAny",
            PrimitiveOp::ContainsNone(_) => "$containsNone",
            PrimitiveOp::Regex(_) => "$regex",
            PrimitiveOp::Glob(_) => "$glob",
            PrimitiveOp::Missing => "$missing",
            PrimitiveOp::Present => "$present",
            PrimitiveOp::NotTrue => "$notTrue",
            PrimitiveOp::Unknown { op, .. } => op,
        }
    }
}

/// Condition attached to one dotted path
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// All operations must hold
    Ops(Vec<PrimitiveOp>),
    /// Some list element satisfies the nested predicate
    ElemMatch(CompiledPredicate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathCondition {
    /// Dotted path relative to the predicate's root object
    pub path: String,
    pub condition: Condition,
}

/// Flattened, executable predicate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledPredicate {
    conditions: Vec<PathCondition>,
}

impl CompiledPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditions(&self) -> &[PathCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Distinct top-level paths in first-use order
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for c in &self.conditions {
            if !paths.contains(&c.path.as_str()) {
                paths.push(&c.path);
            }
        }
        paths
    }

    /// Operations on a path, if any
    pub fn ops(&self, path: &str) -> Option<&[PrimitiveOp]> {
        self.conditions
            .iter()
            .filter(|c| c.path == path)
            .find_map(|c| match &c.condition {
                Condition::Ops(ops) => Some(ops.as_slice()),
                Condition::ElemMatch(_) => None,
            })
    }

    /// First operator, at any depth, that the executor cannot evaluate
    pub fn first_unknown(&self) -> Option<&str> {
        self.conditions.iter().find_map(|c| match &c.condition {
            Condition::Ops(ops) => ops.iter().find_map(|op| match op {
                PrimitiveOp::Unknown { op, .. } => Some(op.as_str()),
                _ => None,
            }),
            Condition::ElemMatch(nested) => nested.first_unknown(),
        })
    }

    pub(crate) fn push_op(&mut self, path: &str, op: PrimitiveOp) {
        let existing = self
            .conditions
            .iter_mut()
            .filter(|c| c.path == path)
            .find_map(|c| match &mut c.condition {
                Condition::Ops(ops) => Some(ops),
                Condition::ElemMatch(_) => None,
            });

        match existing {
            Some(ops) => ops.push(op),
            None => self.conditions.push(PathCondition {
                path: path.to_string(),
                condition: Condition::Ops(vec![op]),
            }),
        }
    }

    pub(crate) fn push_elem_match(&mut self, path: &str, nested: CompiledPredicate) {
        self.conditions.push(PathCondition {
            path: path.to_string(),
            condition: Condition::ElemMatch(nested),
        });
    }

    /// Rewrites every `$ne: true` into the presence-aware [`PrimitiveOp::NotTrue`]
    pub(crate) fn rewrite_ne_true(&mut self) {
        for c in &mut self.conditions {
            match &mut c.condition {
                Condition::Ops(ops) => {
                    for op in ops.iter_mut() {
                        if *op == PrimitiveOp::Ne(Value::Bool(true)) {
                            *op = PrimitiveOp::NotTrue;
                        }
                    }
                }
                Condition::ElemMatch(nested) => nested.rewrite_ne_true(),
            }
        }
    }
}
