//! Error taxonomy of the typed client.
//!
//! Every public call fails with exactly one [`StoreError`]. Build-time
//! failures (`UnsupportedOperator`, `Encoding`) are raised before any backend
//! call; the rest are produced by [`classify`] from a backend answer or by the
//! codec while decoding a response.

use tablekit_model::{BackendError, BackendErrorCode, StoreOperation};
use thiserror::Error;

use crate::key::Key;

/// Result alias for client operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the typed client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An operator outside the supported set, or not allowed where it was used.
    #[error("unsupported operator '{operator}' in {context}")]
    UnsupportedOperator {
        /// The offending operator.
        operator: String,
        /// Where it was used.
        context: &'static str,
    },

    /// A record could not be converted to an attribute map.
    #[error("failed to encode record: {0}")]
    Encoding(String),

    /// An attribute map could not be converted to the requested record shape.
    #[error("failed to decode record: {0}")]
    Decoding(String),

    /// A write's precondition did not hold.
    #[error("conditional check failed: {message}")]
    ConditionalCheckFailed {
        /// Backend detail.
        message: String,
    },

    /// A batch read left keys unprocessed; no items are returned.
    #[error("batch left {} key(s) unprocessed", unprocessed_keys.len())]
    PartialBatchFailure {
        /// Keys the caller has to request again.
        unprocessed_keys: Vec<Key>,
    },

    /// The backend failed or did not answer in time.
    #[error("{operation} failed: {source}")]
    Transport {
        /// The primitive being executed.
        operation: StoreOperation,
        /// The backend answer.
        #[source]
        source: BackendError,
    },
}

impl StoreError {
    /// An operator that is valid in general but not at this position.
    #[must_use]
    pub fn unsupported(operator: impl Into<String>, context: &'static str) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
            context,
        }
    }

    /// Whether repeating the call (possibly after re-reading state) can succeed.
    ///
    /// Build and codec errors are deterministic and never retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConditionalCheckFailed { .. }
                | Self::PartialBatchFailure { .. }
                | Self::Transport { .. }
        )
    }

    /// Returns `true` for a failed precondition.
    #[must_use]
    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(self, Self::ConditionalCheckFailed { .. })
    }
}

/// Map a backend error onto the client taxonomy.
///
/// A condition failure, whether reported directly or as the cause of a
/// cancelled transaction, becomes `ConditionalCheckFailed`. Anything else is a
/// `Transport` error that keeps the backend answer as its source.
#[must_use]
pub fn classify(operation: StoreOperation, error: BackendError) -> StoreError {
    if error.code == BackendErrorCode::ConditionalCheckFailedException
        || error.has_conditional_cancellation()
    {
        return StoreError::ConditionalCheckFailed {
            message: error.message,
        };
    }
    StoreError::Transport {
        operation,
        source: error,
    }
}

#[cfg(test)]
mod tests {
    use tablekit_model::backend_error;
    use tablekit_model::types::CancellationReason;

    use super::*;

    #[test]
    fn test_should_classify_condition_failure() {
        let err = classify(
            StoreOperation::PutItem,
            backend_error!(ConditionalCheckFailedException, "item exists"),
        );
        assert!(err.is_conditional_check_failed());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_should_classify_cancelled_transaction_by_reason() {
        let cancelled = backend_error!(TransactionCanceledException).with_cancellation_reasons(
            vec![
                CancellationReason::none(),
                CancellationReason::conditional_check_failed("exists"),
            ],
        );
        assert!(classify(StoreOperation::TransactWriteItems, cancelled).is_conditional_check_failed());

        let conflict = backend_error!(TransactionCanceledException)
            .with_cancellation_reasons(vec![CancellationReason::with_code("TransactionConflict")]);
        assert!(matches!(
            classify(StoreOperation::TransactWriteItems, conflict),
            StoreError::Transport {
                operation: StoreOperation::TransactWriteItems,
                ..
            }
        ));
    }

    #[test]
    fn test_should_keep_backend_error_as_source() {
        use std::error::Error as _;

        let err = classify(
            StoreOperation::GetItem,
            backend_error!(ResourceNotFoundException, "no such table"),
        );
        let source = err.source().map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("ResourceNotFoundException: no such table")
        );
    }

    #[test]
    fn test_should_not_retry_build_errors() {
        assert!(!StoreError::unsupported("LessThan", "operator name").is_retryable());
        assert!(!StoreError::Encoding("bad".to_owned()).is_retryable());
    }
}
