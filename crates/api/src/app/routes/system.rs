use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. Not part of the resource API, so not enveloped.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
