//! Success/error envelopes and the outgoing shape check.
//!
//! Every body this service writes is one of the two envelopes below. Handlers
//! build one, then [`respond`] checks it against the declared schema before it
//! leaves the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use roastery_core::{ErrorCode, ObjectSchema, Schema, StringRule};

use crate::app::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessEnvelope<T, M = ()> {
    success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<M>,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }
}

impl<T, M> SuccessEnvelope<T, M> {
    pub fn with_meta(data: T, meta: M) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    success: bool,
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>, code: Option<ErrorCode>, details: Option<Value>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                message: message.into(),
                code,
                details,
            },
        }
    }
}

/// `{success: true, data, meta}`. `meta` is required when a meta schema is
/// given and rejected otherwise.
pub fn success_schema(data: Schema, meta: Option<Schema>) -> Schema {
    let envelope = ObjectSchema::new()
        .field("success", Schema::literal(true))
        .field("data", data);
    let envelope = match meta {
        Some(meta) => envelope.field("meta", meta),
        None => envelope,
    };
    envelope.strict().into()
}

/// `{success: false, error: {message, code?, details?}}`.
pub fn error_schema() -> Schema {
    let error = ObjectSchema::new()
        .field("message", StringRule::new())
        .field(
            "code",
            Schema::one_of(ErrorCode::ALL.map(ErrorCode::as_str)).optional(),
        )
        .field("details", Schema::any())
        .strict();
    ObjectSchema::new()
        .field("success", Schema::literal(false))
        .field("error", error)
        .strict()
        .into()
}

/// Serializes `payload`, checks it against `schema` and returns the parsed
/// value.
///
/// A mismatch is a validation failure like any other, so a handler that
/// assembles a malformed body gets a 422 instead of emitting it.
pub fn validate_outgoing<T: Serialize>(schema: &Schema, payload: &T) -> AppResult<Value> {
    let value = serde_json::to_value(payload)
        .map_err(|e| AppError::Unexpected(anyhow::Error::new(e).context("serialize response")))?;
    Ok(schema.parse(&value)?)
}

/// Checks `payload` and writes it with `status`.
pub fn respond<T: Serialize>(status: StatusCode, schema: &Schema, payload: &T) -> AppResult<Response> {
    let body = validate_outgoing(schema, payload)?;
    Ok((status, Json(body)).into_response())
}
