//! Query Executor subsystem
//!
//! Runs compiled predicates over a [`Collection`] and produces
//! deterministic results.
//!
//! # Execution Flow (strict order)
//!
//! 1. Reject predicates holding operations that cannot be evaluated
//! 2. Use indexes to obtain candidate positions
//! 3. Filter candidates strictly according to the predicate
//! 4. Apply sort (if specified)
//! 5. Return ordered results
//!
//! # Invariants
//!
//! - Deterministic execution: unsorted results keep store order
//! - Indexes change cost, never results

mod errors;
mod executor;
mod filters;
mod projection;
mod result;
mod sorter;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use executor::{Collection, ExecutionResult, QueryExecutor};
pub use filters::{compare, values_equal, PredicateFilter};
pub use projection::{distinct, group, Group};
pub use result::QueryOutput;
pub use sorter::ResultSorter;
