//! Resolver-Aware Materializer subsystem
//!
//! Given nodes and the fields a query requires, produces node snapshots in
//! which every required field (including computed and linked ones) holds
//! its resolved value.
//!
//! # Flow
//!
//! 1. Whole-query cache, when the build phase allows it
//! 2. Per node: node cache keyed by (id, content version, fields)
//! 3. Per field, in order: resolver or raw value, then nested fields
//!
//! # Invariants
//!
//! - Stored nodes are never mutated
//! - Concurrent requests for the same key share one resolution
//! - A resolver failure fails the whole batch; no partial results

mod cache;
mod errors;
mod materializer;

pub use cache::{BuildPhase, NodeKey, QueryKey, ResolutionCache, SharedResolution};
pub use errors::{MaterializeError, MaterializeErrorCode, MaterializeResult};
pub use materializer::Materializer;
