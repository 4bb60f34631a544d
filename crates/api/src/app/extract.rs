//! Validating extractors.
//!
//! Each one decodes its part of the request through the target type's schema
//! and rejects with [`AppError`] before the handler runs. Path and query
//! values arrive as strings; their schemas do the coercion.

use std::collections::HashMap;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use serde_json::{Map, Value};

use roastery_core::{ApiError, FieldIssue, HasSchema, IssueType, ValidationErrors};

use crate::app::errors::AppError;

/// JSON body decoded through `T`'s schema.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

/// Path parameters decoded through `T`'s schema.
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

/// Query string decoded through `T`'s schema, defaults applied.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: HasSchema + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::new(rejection.body_text()).with_status(rejection.status().as_u16()))?;
        let value = parse_body(&bytes)?;
        Ok(Self(T::schema().decode(&value)?))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: HasSchema + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| undecodable(rejection.body_text()))?;
        Ok(Self(T::schema().decode(&string_object(raw))?))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: HasSchema + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| undecodable(rejection.body_text()))?;
        Ok(Self(T::schema().decode(&string_object(raw))?))
    }
}

/// An empty body reads as `{}`, so a missing body reports missing fields.
fn parse_body(bytes: &[u8]) -> Result<Value, ValidationErrors> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|e| {
        FieldIssue::new("", format!("Malformed JSON body: {e}"), IssueType::InvalidJson).into()
    })
}

/// Path or query text axum could not even split into strings (bad percent
/// encoding, invalid UTF-8). Reported as a validation failure like any other.
fn undecodable(message: String) -> ValidationErrors {
    FieldIssue::new("", message, IssueType::InvalidString).into()
}

fn string_object(raw: HashMap<String, String>) -> Value {
    Value::Object(raw.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use roastery_coffee::NewCoffee;
    use roastery_core::{IdParams, PageRequest};
    use serde_json::json;
    use tower::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route(
                "/body",
                post(|ValidJson(body): ValidJson<NewCoffee>| async move { Json(json!({ "name": body.name })) }),
            )
            .route(
                "/items/:id",
                get(|ValidPath(params): ValidPath<IdParams>| async move { Json(json!({ "id": params.id })) }),
            )
            .route(
                "/items",
                get(|ValidQuery(page): ValidQuery<PageRequest>| async move {
                    Json(json!({ "page": page.page, "limit": page.limit })).into_response()
                }),
            )
    }

    async fn call(req: HttpRequest<Body>) -> (StatusCode, Value) {
        let res = router().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_body(body: &'static str) -> HttpRequest<Body> {
        HttpRequest::post("/body")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get_uri(uri: &str) -> HttpRequest<Body> {
        HttpRequest::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn json_body_passes_through_when_valid() {
        let (status, body) = call(post_body(r#"{"name":"Mocha","price":3.5}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "name": "Mocha" }));
    }

    #[tokio::test]
    async fn json_body_reports_each_failing_field() {
        let (status, body) = call(post_body(r#"{"name":"","price":0}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<_> = body["error"]["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(fields, ["name", "price"]);
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_failure() {
        let (status, body) = call(post_body("{not json")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["type"], json!("invalid_json"));
        assert_eq!(body["error"]["details"][0]["field"], json!(""));
    }

    #[tokio::test]
    async fn empty_body_reports_required_fields() {
        let (status, body) = call(post_body("")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["message"], json!("Required"));
    }

    #[tokio::test]
    async fn path_ids_are_coerced() {
        let (status, body) = call(get_uri("/items/17")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": 17 }));
    }

    #[tokio::test]
    async fn bad_path_ids_are_rejected() {
        for uri in ["/items/abc", "/items/0", "/items/-3", "/items/1.5"] {
            let (status, body) = call(get_uri(uri)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            assert_eq!(body["error"]["details"][0]["field"], json!("id"));
        }
    }

    #[tokio::test]
    async fn undecodable_path_segments_are_validation_failures() {
        for uri in ["/items/%FF", "/items/%C3%28"] {
            let (status, body) = call(get_uri(uri)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
            assert_eq!(body["error"]["details"][0]["type"], json!("invalid_string"));
        }
    }

    #[tokio::test]
    async fn query_defaults_and_coercion() {
        let (_, body) = call(get_uri("/items")).await;
        assert_eq!(body, json!({ "page": 1, "limit": 10 }));

        let (_, body) = call(get_uri("/items?page=3&limit=25")).await;
        assert_eq!(body, json!({ "page": 3, "limit": 25 }));

        let (status, body) = call(get_uri("/items?page=abc")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["message"], json!("Page must be a number"));
    }
}
