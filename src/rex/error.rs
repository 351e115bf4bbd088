//! Error types for expression construction and rewriting.

use crate::rex::node::RexKind;
use crate::types::SqlTypeName;
use thiserror::Error;

/// Errors raised while building or transforming expressions.
///
/// All of these are usage errors: retrying the same call fails the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RexError {
    /// Operand count or types do not match the operator's signature
    #[error("Invalid use of operator {operator}: {reason}")]
    InvalidOperatorUse { operator: String, reason: String },

    /// Field index out of range for the referenced row type
    #[error("Field index {index} out of bounds for type {type_digest} with {field_count} fields")]
    InvalidFieldIndex {
        index: usize,
        field_count: usize,
        type_digest: String,
    },

    /// Field name not present in the referenced row type
    #[error("Unknown field '{name}' in type {type_digest}")]
    UnknownField { name: String, type_digest: String },

    /// A shuttle met a node kind it does not transform
    #[error("{shuttle} does not support {kind} nodes")]
    UnsupportedTransformation {
        shuttle: &'static str,
        kind: RexKind,
    },

    /// Literal value does not fit its type-name tag or type
    #[error("Invalid literal {value} for {type_name} of type {type_digest}")]
    InvalidLiteral {
        value: String,
        type_name: SqlTypeName,
        type_digest: String,
    },

    /// Window specification is malformed
    #[error("Invalid window: {reason}")]
    InvalidWindow { reason: String },

    /// Shifting an input reference moved its index past `usize::MAX`
    #[error("Input index {index} shifted by {offset} overflows")]
    IndexOverflow { index: usize, offset: usize },

    /// Expression nesting exceeds the configured limit
    #[error("Expression nesting depth {depth} exceeds limit {limit}")]
    NestingTooDeep { depth: usize, limit: usize },
}

/// Result type for expression operations
pub type RexResult<T> = Result<T, RexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RexError::InvalidOperatorUse {
            operator: "+".to_string(),
            reason: "expects exactly 2 operands, got 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid use of operator +: expects exactly 2 operands, got 1"
        );

        let err = RexError::InvalidFieldIndex {
            index: 3,
            field_count: 2,
            type_digest: "RecordType(INTEGER a, INTEGER b)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Field index 3 out of bounds for type RecordType(INTEGER a, INTEGER b) with 2 fields"
        );

        let err = RexError::UnsupportedTransformation {
            shuttle: "RexCopier",
            kind: RexKind::InputRef,
        };
        assert_eq!(err.to_string(), "RexCopier does not support InputRef nodes");

        let err = RexError::IndexOverflow {
            index: 2,
            offset: usize::MAX,
        };
        assert_eq!(
            err.to_string(),
            format!("Input index 2 shifted by {} overflows", usize::MAX)
        );

        let err = RexError::NestingTooDeep {
            depth: 300,
            limit: 256,
        };
        assert_eq!(
            err.to_string(),
            "Expression nesting depth 300 exceeds limit 256"
        );
    }
}
