//! Node error types
//!
//! Error codes:
//! - NQ_MALFORMED_NODE (REJECT)

use std::fmt;

use thiserror::Error;

use crate::error::Severity;

/// Node-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeErrorCode {
    /// Node JSON lacks identity or type metadata
    NqMalformedNode,
}

impl NodeErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            NodeErrorCode::NqMalformedNode => "NQ_MALFORMED_NODE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for NodeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Node error with code and message
#[derive(Debug, Clone, Error)]
#[error("[{}] {}: {}", .code.severity(), .code, .message)]
pub struct NodeError {
    code: NodeErrorCode,
    message: String,
}

impl NodeError {
    /// Create a malformed node error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            code: NodeErrorCode::NqMalformedNode,
            message: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> NodeErrorCode {
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

/// Result type for node operations
pub type NodeResult<T> = Result<T, NodeError>;
