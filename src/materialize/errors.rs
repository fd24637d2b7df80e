//! Materializer error types
//!
//! Error codes:
//! - NQ_RESOLUTION_FAILURE (ERROR): a resolver failed; the whole batch fails
//! - NQ_UNKNOWN_TYPE (REJECT)
//! - NQ_UNKNOWN_FIELD (REJECT)

use std::fmt;

use thiserror::Error;

use crate::error::Severity;
use crate::schema::ResolverError;

/// Materializer-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeErrorCode {
    NqResolutionFailure,
    NqUnknownType,
    NqUnknownField,
}

impl MaterializeErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            MaterializeErrorCode::NqResolutionFailure => "NQ_RESOLUTION_FAILURE",
            MaterializeErrorCode::NqUnknownType => "NQ_UNKNOWN_TYPE",
            MaterializeErrorCode::NqUnknownField => "NQ_UNKNOWN_FIELD",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            MaterializeErrorCode::NqResolutionFailure => Severity::Error,
            MaterializeErrorCode::NqUnknownType | MaterializeErrorCode::NqUnknownField => {
                Severity::Reject
            }
        }
    }
}

impl fmt::Display for MaterializeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Materialization error.
///
/// `Clone` so one failed shared resolution can be handed to every waiter.
#[derive(Debug, Clone, Error)]
#[error("[{}] {}: {}", .code.severity(), .code, .message)]
pub struct MaterializeError {
    code: MaterializeErrorCode,
    message: String,
    node_id: Option<String>,
}

impl MaterializeError {
    /// A resolver failed while materializing a node
    pub fn resolution_failure(
        type_name: &str,
        field: &str,
        node_id: &str,
        cause: &ResolverError,
    ) -> Self {
        Self {
            code: MaterializeErrorCode::NqResolutionFailure,
            message: format!(
                "Resolver for {}.{} failed on node {}: {}",
                type_name, field, node_id, cause
            ),
            node_id: Some(node_id.to_string()),
        }
    }

    pub fn unknown_type(type_name: &str) -> Self {
        Self {
            code: MaterializeErrorCode::NqUnknownType,
            message: format!("Unknown type '{}'", type_name),
            node_id: None,
        }
    }

    pub fn unknown_field(type_name: &str, field: &str) -> Self {
        Self {
            code: MaterializeErrorCode::NqUnknownField,
            message: format!("Type '{}' has no field '{}'", type_name, field),
            node_id: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> MaterializeErrorCode {
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

    /// Node whose materialization failed, if known
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }
}

/// Result type for materializer operations
pub type MaterializeResult<T> = Result<T, MaterializeError>;
