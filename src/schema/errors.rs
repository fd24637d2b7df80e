//! Schema error types
//!
//! Error codes:
//! - NQ_UNKNOWN_TYPE (REJECT)
//! - NQ_UNKNOWN_FIELD (REJECT)
//! - NQ_SCHEMA_MISMATCH (REJECT)
//! - NQ_MALFORMED_TYPE_DEFINITION (REJECT)
//! - NQ_DUPLICATE_TYPE (REJECT)

use std::fmt;

use thiserror::Error;

use crate::error::Severity;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Type name not registered
    NqUnknownType,
    /// Field not declared on its type
    NqUnknownField,
    /// Field exists but its kind does not support the request
    NqSchemaMismatch,
    /// Type definition could not be parsed
    NqMalformedTypeDefinition,
    /// Type registered twice
    NqDuplicateType,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::NqUnknownType => "NQ_UNKNOWN_TYPE",
            SchemaErrorCode::NqUnknownField => "NQ_UNKNOWN_FIELD",
            SchemaErrorCode::NqSchemaMismatch => "NQ_SCHEMA_MISMATCH",
            SchemaErrorCode::NqMalformedTypeDefinition => "NQ_MALFORMED_TYPE_DEFINITION",
            SchemaErrorCode::NqDuplicateType => "NQ_DUPLICATE_TYPE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with code and message
#[derive(Debug, Clone, Error)]
#[error("[{}] {}: {}", .code.severity(), .code, .message)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
}

impl SchemaError {
    /// Type is not registered
    pub fn unknown_type(type_name: &str) -> Self {
        Self {
            code: SchemaErrorCode::NqUnknownType,
            message: format!("Unknown type: {}", type_name),
        }
    }

    /// Field is not declared on the type
    pub fn unknown_field(type_name: &str, field: &str) -> Self {
        Self {
            code: SchemaErrorCode::NqUnknownField,
            message: format!("Unknown field {}.{}", type_name, field),
        }
    }

    /// Field kind does not support the request
    pub fn schema_mismatch(type_name: &str, field: &str, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::NqSchemaMismatch,
            message: format!("{}.{}: {}", type_name, field, reason.into()),
        }
    }

    /// Type definition is malformed
    pub fn malformed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::NqMalformedTypeDefinition,
            message: format!("{}: {}", source.into(), reason.into()),
        }
    }

    /// Type registered twice
    pub fn duplicate_type(type_name: &str) -> Self {
        Self {
            code: SchemaErrorCode::NqDuplicateType,
            message: format!("Type {} is already registered", type_name),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
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

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
