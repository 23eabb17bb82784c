//! Engine errors and their mapping onto backend error codes.

use tablekit_model::{BackendError, BackendErrorCode};
use thiserror::Error;

/// Errors produced while parsing or evaluating an expression.
#[derive(Debug, Error)]
pub enum ExpressionError {
    /// The parser met a token it cannot use here.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What the grammar allows at this position.
        expected: String,
        /// What the input contained.
        found: String,
    },
    /// A `#name` placeholder has no entry in the name map.
    #[error("unresolved expression attribute name: {name}")]
    UnresolvedName {
        /// The placeholder.
        name: String,
    },
    /// A `:value` placeholder has no entry in the value map.
    #[error("unresolved expression attribute value: {name}")]
    UnresolvedValue {
        /// The placeholder.
        name: String,
    },
    /// An argument has the wrong shape for the function or action.
    #[error("invalid operand for {operation}: {message}")]
    InvalidOperand {
        /// Function or action name.
        operation: &'static str,
        /// Detail.
        message: String,
    },
    /// Operand types do not fit the operation.
    #[error("type mismatch: {message}")]
    TypeMismatch {
        /// Detail.
        message: String,
    },
}

/// Errors produced by the partition storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The item lacks one of the table's key attributes.
    #[error("missing required key attribute: {attribute}")]
    MissingKeyAttribute {
        /// Attribute name from the key schema.
        attribute: String,
    },
    /// A key attribute is not a string, number or binary.
    #[error("key attribute '{attribute}' must be S, N or B, got {actual}")]
    InvalidKeyType {
        /// Attribute name from the key schema.
        attribute: String,
        /// Type descriptor of the stored value.
        actual: &'static str,
    },
    /// An update tried to change a key attribute.
    #[error("cannot update attribute {attribute}: it is part of the key")]
    KeyAttributeUpdated {
        /// Attribute name from the key schema.
        attribute: String,
    },
}

impl From<ExpressionError> for BackendError {
    fn from(e: ExpressionError) -> Self {
        Self::validation(format!("invalid expression: {e}"))
    }
}

impl From<StorageError> for BackendError {
    fn from(e: StorageError) -> Self {
        Self::with_message(BackendErrorCode::ValidationException, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_engine_errors_to_validation() {
        let from_expression: BackendError = ExpressionError::UnresolvedValue {
            name: ":v9".to_owned(),
        }
        .into();
        assert_eq!(from_expression.code, BackendErrorCode::ValidationException);
        assert!(from_expression.message.contains(":v9"));

        let from_storage: BackendError = StorageError::MissingKeyAttribute {
            attribute: "sk".to_owned(),
        }
        .into();
        assert_eq!(from_storage.code, BackendErrorCode::ValidationException);
        assert_eq!(from_storage.message, "missing required key attribute: sk");
    }
}
