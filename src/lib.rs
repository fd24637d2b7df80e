//! nodequery - filter, sort and project in-memory content nodes
//!
//! A GraphQL-shaped query engine over semi-structured content nodes:
//!
//! - [`filter`] derives the filter input shape of each type
//! - [`compiler`] compiles filter expressions into flat predicates
//! - [`index`] builds indexes for frequently filtered paths
//! - [`executor`] evaluates predicates, sorts and projects
//! - [`materialize`] resolves computed and linked fields before filtering
//! - [`engine`] ties them together behind `query` and `nodes_for_query`

pub mod cli;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod executor;
pub mod filter;
pub mod index;
pub mod materialize;
pub mod node;
pub mod observability;
pub mod schema;

pub use engine::{EngineConfig, QueryEngine};
pub use error::{EngineError, EngineResult, Severity};
