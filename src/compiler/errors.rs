//! Compiler error types
//!
//! Error codes:
//! - NQ_UNKNOWN_TYPE (REJECT)
//! - NQ_UNKNOWN_FIELD (REJECT)
//! - NQ_SCHEMA_MISMATCH (REJECT)
//! - NQ_MALFORMED_FILTER (REJECT)

use std::fmt;

use thiserror::Error;

use crate::error::Severity;

/// Compiler-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorCode {
    /// Queried type is not registered
    NqUnknownType,
    /// Filter or sort references an undeclared field
    NqUnknownField,
    /// Operator or nesting not supported by the field's kind
    NqSchemaMismatch,
    /// Filter, sort or argument structure is invalid
    NqMalformedFilter,
}

impl CompileErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorCode::NqUnknownType => "NQ_UNKNOWN_TYPE",
            CompileErrorCode::NqUnknownField => "NQ_UNKNOWN_FIELD",
            CompileErrorCode::NqSchemaMismatch => "NQ_SCHEMA_MISMATCH",
            CompileErrorCode::NqMalformedFilter => "NQ_MALFORMED_FILTER",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Compiler error with full context
#[derive(Debug, Clone, Error)]
#[error("[{}] {}: {}", .code.severity(), .code, .message)]
pub struct CompileError {
    code: CompileErrorCode,
    message: String,
    /// Dotted field path if applicable
    field: Option<String>,
}

impl CompileError {
    /// Create an unknown type error
    pub fn unknown_type(type_name: &str) -> Self {
        Self {
            code: CompileErrorCode::NqUnknownType,
            message: format!("Unknown type: {}", type_name),
            field: None,
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(type_name: &str, field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: CompileErrorCode::NqUnknownField,
            message: format!("Field '{}' is not declared on type {}", f, type_name),
            field: Some(f),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: CompileErrorCode::NqSchemaMismatch,
            message: format!("Field '{}': {}", f, reason.into()),
            field: Some(f),
        }
    }

    /// Create a malformed filter error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::NqMalformedFilter,
            message: reason.into(),
            field: None,
        }
    }

    /// Create a malformed filter error for one field
    pub fn malformed_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: CompileErrorCode::NqMalformedFilter,
            message: format!("Field '{}': {}", f, reason.into()),
            field: Some(f),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> CompileErrorCode {
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

    /// Returns the field path if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;
