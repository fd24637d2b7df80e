//! Crate-wide error plumbing
//!
//! Each subsystem defines its own coded error in its `errors.rs`. The engine
//! facade folds them into [`EngineError`].

use std::fmt;

use thiserror::Error;

use crate::compiler::CompileError;
use crate::engine::ConfigError;
use crate::executor::ExecutorError;
use crate::materialize::MaterializeError;
use crate::node::NodeError;
use crate::schema::SchemaError;

/// Severity levels shared by every subsystem error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller error, the request is rejected
    Reject,
    /// Operation failed while running
    Error,
    /// Degraded but the operation continues
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Warn => write!(f, "WARN"),
        }
    }
}

/// Error returned by the engine facade
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Schema(e) => e.code().code(),
            EngineError::Compile(e) => e.code().code(),
            EngineError::Executor(e) => e.code().code(),
            EngineError::Materialize(e) => e.code().code(),
            EngineError::Node(e) => e.code().code(),
            EngineError::Config(e) => e.code().code(),
        }
    }

    /// Returns the severity of the underlying error
    pub fn severity(&self) -> Severity {
        match self {
            EngineError::Schema(e) => e.severity(),
            EngineError::Compile(e) => e.severity(),
            EngineError::Executor(e) => e.severity(),
            EngineError::Materialize(e) => e.severity(),
            EngineError::Node(e) => e.severity(),
            EngineError::Config(e) => e.severity(),
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
