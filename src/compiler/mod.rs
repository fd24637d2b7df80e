//! Filter compiler subsystem
//!
//! Turns user filter expressions into flat predicates the executor can
//! evaluate and the indexer can count.
//!
//! # Flow
//!
//! 1. Parse JSON into a [`FilterExpr`] (object values nest, others are operators)
//! 2. Resolve each field against the type registry
//! 3. Translate operator leaves by field kind
//! 4. Flatten nested fields into dotted paths, stopping at `elemMatch`
//! 5. Rewrite `ne: true` into a presence-aware check
//!
//! # Invariants
//!
//! - Compilation is a pure function of (filter, type metadata)
//! - Unknown operators are forwarded, never dropped
//! - Required-field sets are ordered and hashable

mod ast;
mod compiler;
mod errors;
mod pattern;
mod predicate;
mod required;

pub use ast::{FilterEntry, FilterExpr, Operator, Projection, QueryArgs, SortDirection, SortField, SortSpec, ELEM_MATCH};
pub use compiler::FilterCompiler;
pub use errors::{CompileError, CompileErrorCode, CompileResult};
pub use pattern::{GlobMatcher, RegexMatcher};
pub use predicate::{CompiledPredicate, Condition, PathCondition, PrimitiveOp};
pub use required::{RequiredField, RequiredFields};
