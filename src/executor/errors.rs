//! Executor error types
//!
//! Error codes:
//! - NQ_MALFORMED_QUERY (REJECT)

use std::fmt;

use thiserror::Error;

use crate::error::Severity;

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Predicate holds an operation the executor cannot evaluate
    NqMalformedQuery,
}

impl ExecutorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::NqMalformedQuery => "NQ_MALFORMED_QUERY",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error with code and message
#[derive(Debug, Clone, Error)]
#[error("[{}] {}: {}", .code.severity(), .code, .message)]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
}

impl ExecutorError {
    /// Create a malformed query error for an operator that cannot be evaluated
    pub fn malformed_query(op: &str) -> Self {
        Self {
            code: ExecutorErrorCode::NqMalformedQuery,
            message: format!("Cannot evaluate operator '{}'", op),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
