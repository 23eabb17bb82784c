//! Errors reported by a store backend.
//!
//! A backend answers a failed call with an error code and a message; for
//! transactional writes it may also attach one cancellation reason per
//! submitted item. Transports translate their native failures into
//! [`BackendError`] so the client can classify them uniformly.

use std::fmt;

use crate::types::CancellationReason;

/// Well-known backend error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum BackendErrorCode {
    /// Table not found.
    ResourceNotFoundException,
    /// A condition expression evaluated to false.
    ConditionalCheckFailedException,
    /// A transaction was cancelled; see the cancellation reasons.
    TransactionCanceledException,
    /// Another transaction touched the same item.
    TransactionConflictException,
    /// Provisioned throughput exceeded.
    ProvisionedThroughputExceededException,
    /// Account-level request limit exceeded.
    RequestLimitExceeded,
    /// Request rate throttled.
    ThrottlingException,
    /// Malformed request.
    #[default]
    ValidationException,
    /// Internal backend failure.
    InternalServerError,
    /// Backend temporarily unavailable.
    ServiceUnavailable,
    /// The call never produced a backend answer (connection, timeout, dispatch).
    TransportFailure,
    /// A code this crate does not know about.
    Unknown,
}

impl BackendErrorCode {
    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceNotFoundException => "ResourceNotFoundException",
            Self::ConditionalCheckFailedException => "ConditionalCheckFailedException",
            Self::TransactionCanceledException => "TransactionCanceledException",
            Self::TransactionConflictException => "TransactionConflictException",
            Self::ProvisionedThroughputExceededException => {
                "ProvisionedThroughputExceededException"
            }
            Self::RequestLimitExceeded => "RequestLimitExceeded",
            Self::ThrottlingException => "ThrottlingException",
            Self::ValidationException => "ValidationException",
            Self::InternalServerError => "InternalServerError",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::TransportFailure => "TransportFailure",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a service error code. Unrecognized codes map to [`Self::Unknown`].
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "ResourceNotFoundException" => Self::ResourceNotFoundException,
            "ConditionalCheckFailedException" => Self::ConditionalCheckFailedException,
            "TransactionCanceledException" => Self::TransactionCanceledException,
            "TransactionConflictException" => Self::TransactionConflictException,
            "ProvisionedThroughputExceededException" => {
                Self::ProvisionedThroughputExceededException
            }
            "RequestLimitExceeded" => Self::RequestLimitExceeded,
            "ThrottlingException" => Self::ThrottlingException,
            "ValidationException" => Self::ValidationException,
            "InternalServerError" => Self::InternalServerError,
            "ServiceUnavailable" => Self::ServiceUnavailable,
            _ => Self::Unknown,
        }
    }

    /// Whether a caller may reasonably retry the same request later.
    #[must_use]
    pub fn is_throttling(&self) -> bool {
        matches!(
            self,
            Self::ProvisionedThroughputExceededException
                | Self::RequestLimitExceeded
                | Self::ThrottlingException
                | Self::ServiceUnavailable
        )
    }
}

impl fmt::Display for BackendErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error answer from a store backend.
#[derive(Debug)]
pub struct BackendError {
    /// The error code.
    pub code: BackendErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// Per-item reasons for a cancelled transaction, in submission order.
    pub cancellation_reasons: Vec<CancellationReason>,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl BackendError {
    /// Create an error whose message is the code itself.
    #[must_use]
    pub fn new(code: BackendErrorCode) -> Self {
        Self::with_message(code, code.as_str())
    }

    /// Create an error with a custom message.
    #[must_use]
    pub fn with_message(code: BackendErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cancellation_reasons: Vec::new(),
            source: None,
        }
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach per-item cancellation reasons.
    #[must_use]
    pub fn with_cancellation_reasons(mut self, reasons: Vec<CancellationReason>) -> Self {
        self.cancellation_reasons = reasons;
        self
    }

    /// A condition expression evaluated to false.
    #[must_use]
    pub fn conditional_check_failed(message: impl Into<String>) -> Self {
        Self::with_message(BackendErrorCode::ConditionalCheckFailedException, message)
    }

    /// The request is malformed.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(BackendErrorCode::ValidationException, message)
    }

    /// The table does not exist.
    #[must_use]
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::with_message(BackendErrorCode::ResourceNotFoundException, message)
    }

    /// The call failed before the backend answered.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::with_message(BackendErrorCode::TransportFailure, message)
    }

    /// `true` when any item of a cancelled transaction failed its condition.
    #[must_use]
    pub fn has_conditional_cancellation(&self) -> bool {
        self.code == BackendErrorCode::TransactionCanceledException
            && self
                .cancellation_reasons
                .iter()
                .any(CancellationReason::is_conditional_check_failed)
    }
}

/// Create a [`BackendError`] from an error code.
///
/// # Examples
///
/// ```
/// use tablekit_model::backend_error;
/// use tablekit_model::error::BackendErrorCode;
///
/// let err = backend_error!(ValidationException);
/// assert_eq!(err.code, BackendErrorCode::ValidationException);
///
/// let err = backend_error!(ResourceNotFoundException, "table not found");
/// assert_eq!(err.message, "table not found");
/// ```
#[macro_export]
macro_rules! backend_error {
    ($code:ident) => {
        $crate::error::BackendError::new($crate::error::BackendErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::BackendError::with_message($crate::error::BackendErrorCode::$code, $msg)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_unknown_codes() {
        assert_eq!(
            BackendErrorCode::from_code("ConditionalCheckFailedException"),
            BackendErrorCode::ConditionalCheckFailedException
        );
        assert_eq!(
            BackendErrorCode::from_code("SomethingElse"),
            BackendErrorCode::Unknown
        );
    }

    #[test]
    fn test_should_detect_conditional_cancellation() {
        let err = backend_error!(TransactionCanceledException).with_cancellation_reasons(vec![
            CancellationReason::none(),
            CancellationReason::conditional_check_failed("exists"),
        ]);
        assert!(err.has_conditional_cancellation());

        let conflict = backend_error!(TransactionCanceledException)
            .with_cancellation_reasons(vec![CancellationReason::with_code("TransactionConflict")]);
        assert!(!conflict.has_conditional_cancellation());
    }
}
