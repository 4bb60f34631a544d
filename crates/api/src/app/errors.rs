//! The error boundary: every failure becomes an error envelope here.

use std::any::Any;
use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

use roastery_core::{ApiError, ErrorCode, Schema, ValidationErrors};
use roastery_infra::StoreError;

use crate::app::envelope::{self, ErrorEnvelope};

pub const VALIDATION_MESSAGE: &str = "Request validation error";
pub const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// Every way a request can fail, in the order the boundary checks them.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input (or an outgoing body) did not match its schema.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A deliberate failure carrying its own status and code.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Anything else. Logged in full, never shown to the client.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Unexpected(anyhow::Error::new(err))
    }
}

impl AppError {
    /// Status and envelope for this error.
    pub fn to_envelope(&self) -> (StatusCode, ErrorEnvelope) {
        match self {
            AppError::Validation(errors) => {
                debug!(issues = errors.issues().len(), "request validation failed");
                let details = serde_json::to_value(errors.issues()).ok();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorEnvelope::new(VALIDATION_MESSAGE, Some(ErrorCode::ValidationError), details),
                )
            }
            AppError::Api(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    warn!(status = status.as_u16(), message = err.message(), "application error");
                } else {
                    debug!(status = status.as_u16(), message = err.message(), "application error");
                }
                (
                    status,
                    ErrorEnvelope::new(err.message(), err.code(), err.details().cloned()),
                )
            }
            AppError::Unexpected(err) => {
                error!(error = ?err, "unhandled error");
                internal_envelope()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, envelope) = self.to_envelope();
        render_error(status, &envelope)
    }
}

/// Writes `envelope` if it matches the error schema, the constant 500 otherwise.
fn render_error<T: Serialize>(status: StatusCode, envelope: &T) -> Response {
    match envelope::validate_outgoing(error_schema(), envelope) {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => {
            error!(error = %err, "error envelope failed its own schema");
            internal_response()
        }
    }
}

fn error_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(envelope::error_schema)
}

fn internal_envelope() -> (StatusCode, ErrorEnvelope) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorEnvelope::new(INTERNAL_MESSAGE, Some(ErrorCode::InternalError), None),
    )
}

/// The generic 500 envelope, built without any fallible step.
pub fn internal_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": { "message": INTERNAL_MESSAGE, "code": ErrorCode::InternalError.as_str() },
        })),
    )
        .into_response()
}

/// Renders a handler panic as the generic 500 envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("<non-string panic payload>");
    error!(panic = message, "handler panicked");
    internal_response()
}

/// Fallback for paths no route matches.
pub async fn route_not_found() -> AppError {
    AppError::Api(ApiError::not_found("Route not found"))
}

/// Fallback for a known path hit with an unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::Api(ApiError::new("Method not allowed").with_status(405))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use roastery_core::{FieldIssue, IssueType};
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_become_422_with_details() {
        let errors = ValidationErrors::new(vec![
            FieldIssue::new("name", "Name is required", IssueType::TooSmall),
            FieldIssue::new("price", "Price must be positive", IssueType::TooSmall),
        ]);
        let (status, body) = render(errors.into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["message"], json!(VALIDATION_MESSAGE));
        assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
        assert_eq!(
            body["error"]["details"],
            json!([
                { "field": "name", "message": "Name is required", "type": "too_small" },
                { "field": "price", "message": "Price must be positive", "type": "too_small" },
            ])
        );
    }

    #[tokio::test]
    async fn api_errors_keep_their_own_status_and_code() {
        let (status, body) = render(ApiError::not_found("Coffee not found").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "success": false, "error": { "message": "Coffee not found", "code": "RESOURCE_NOT_FOUND" } })
        );

        let (status, body) = render(ApiError::invalid_state("Coffee is retired").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("INVALID_RESOURCE_STATUS"));
    }

    #[tokio::test]
    async fn api_error_details_pass_through() {
        let err = ApiError::new("Out of beans")
            .with_status(409)
            .with_details(json!({ "bean": "arabica" }));
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["details"], json!({ "bean": "arabica" }));
        assert!(body["error"].get("code").is_none());
    }

    #[tokio::test]
    async fn out_of_range_status_falls_back_to_500() {
        let (status, _) = render(ApiError::new("weird").with_status(1000).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unexpected_errors_never_leak() {
        let err = anyhow::anyhow!("connection refused to 10.0.0.7:5432");
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "success": false, "error": { "message": INTERNAL_MESSAGE, "code": "INTERNAL_ERROR" } })
        );
    }

    #[tokio::test]
    async fn store_errors_are_unexpected() {
        let err: AppError = StoreError::Poisoned.into();
        assert!(matches!(err, AppError::Unexpected(_)));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], json!("INTERNAL_ERROR"));
    }

    #[tokio::test]
    async fn panics_render_the_internal_envelope() {
        let res = panic_response(Box::new("boom"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["message"], json!(INTERNAL_MESSAGE));
    }

    #[tokio::test]
    async fn nonconforming_envelope_degrades_to_internal_error() {
        let bogus = json!({ "success": true, "error": { "message": "x", "code": "TEAPOT" } });
        let res = render_error(StatusCode::NOT_FOUND, &bogus);
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({ "success": false, "error": { "message": INTERNAL_MESSAGE, "code": "INTERNAL_ERROR" } })
        );
    }

    #[tokio::test]
    async fn internal_response_matches_the_error_schema() {
        let res = internal_response();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(error_schema().parse(&body).is_ok());
    }

    #[test]
    fn every_branch_builds_a_conforming_envelope() {
        let errors = [
            AppError::Validation(
                FieldIssue::new("", "Expected object, received null", IssueType::InvalidType).into(),
            ),
            AppError::Api(ApiError::not_found("x")),
            AppError::Api(ApiError::new("y").with_status(418)),
            AppError::Unexpected(anyhow::anyhow!("z")),
        ];
        for err in errors {
            let (_, env) = err.to_envelope();
            assert!(envelope::validate_outgoing(error_schema(), &env).is_ok());
        }
    }
}
