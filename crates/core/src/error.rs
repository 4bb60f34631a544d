//! Typed application error model.
//!
//! Every deliberate failure raised by application code is an [`ApiError`]: a
//! single shape carrying a message, an HTTP status, an optional machine-readable
//! [`ErrorCode`] and optional structured details. New kinds of failure are added
//! as constructors over that shape rather than as new types.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status used when an error does not name one.
pub const DEFAULT_STATUS: u16 = 500;

/// Machine-readable failure tag carried in the error envelope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ResourceNotFound,
    InvalidResourceStatus,
    /// Reserved. Persistence failures currently surface as `InternalError`.
    DatabaseOperationFailed,
    ValidationError,
    InternalError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 5] = [
        ErrorCode::ResourceNotFound,
        ErrorCode::InvalidResourceStatus,
        ErrorCode::DatabaseOperationFailed,
        ErrorCode::ValidationError,
        ErrorCode::InternalError,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::InvalidResourceStatus => "INVALID_RESOURCE_STATUS",
            ErrorCode::DatabaseOperationFailed => "DATABASE_OPERATION_FAILED",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that is not one of the known codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

/// Which constructor produced an [`ApiError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// A by-id lookup found nothing.
    NotFound,
    /// The request is well-formed but breaks a business precondition.
    InvalidState,
    /// Any other deliberate failure built with [`ApiError::new`].
    Other,
}

/// A failure raised deliberately by application code.
///
/// Handlers never write error responses themselves; they return one of these
/// and the HTTP layer renders it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
    status_code: u16,
    code: Option<ErrorCode>,
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// Generic application error: status 500, no code, no details.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Other,
            message: message.into(),
            status_code: DEFAULT_STATUS,
            code: None,
            details: None,
        }
    }

    /// 404 `RESOURCE_NOT_FOUND`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: message.into(),
            status_code: 404,
            code: Some(ErrorCode::ResourceNotFound),
            details: None,
        }
    }

    /// 400 `INVALID_RESOURCE_STATUS`.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::InvalidState,
            message: message.into(),
            status_code: 400,
            code: Some(ErrorCode::InvalidResourceStatus),
            details: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        self.details.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_found_carries_404_and_code() {
        let err = ApiError::not_found("Coffee not found");
        assert_eq!(err.kind(), ApiErrorKind::NotFound);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.code(), Some(ErrorCode::ResourceNotFound));
        assert_eq!(err.message(), "Coffee not found");
        assert!(err.details().is_none());
    }

    #[test]
    fn invalid_state_carries_400_and_code() {
        let err = ApiError::invalid_state("Coffee is discontinued");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), Some(ErrorCode::InvalidResourceStatus));
    }

    #[test]
    fn generic_error_defaults_to_500_without_code() {
        let err = ApiError::new("boom");
        assert_eq!(err.status_code(), DEFAULT_STATUS);
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn builders_extend_the_shared_shape() {
        let err = ApiError::new("Payment required")
            .with_status(402)
            .with_code(ErrorCode::InvalidResourceStatus)
            .with_details(json!({ "balance": 0 }));
        assert_eq!(err.status_code(), 402);
        assert_eq!(err.code(), Some(ErrorCode::InvalidResourceStatus));
        assert_eq!(err.details(), Some(&json!({ "balance": 0 })));
    }

    #[test]
    fn error_codes_serialize_as_screaming_snake_case() {
        for code in ErrorCode::ALL {
            let wire = serde_json::to_value(code).unwrap();
            assert_eq!(wire, json!(code.as_str()));
            assert_eq!(code.as_str().parse::<ErrorCode>().unwrap(), code);
        }
        assert!("NOPE".parse::<ErrorCode>().is_err());
    }
}
