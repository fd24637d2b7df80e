//! Engine facade
//!
//! Exposes `query` and `nodes_for_query` over a type registry and a node
//! store, and accepts the store's invalidation signals.
//!
//! # Query flow
//!
//! 1. Compile the filter, validate sort and projection paths
//! 2. Materialize the fields the query needs (skipped when none resolve)
//! 3. Record path usage; index hot paths and sort paths
//! 4. Execute, then apply skip and limit

mod config;
mod engine;
mod errors;

pub use config::EngineConfig;
pub use engine::QueryEngine;
pub use errors::{ConfigError, ConfigErrorCode, ConfigResult};
