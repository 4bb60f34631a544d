//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the per-resource services
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `extract.rs`: validating extractors for body, path and query
//! - `envelope.rs`: success/error envelopes and the outgoing shape check
//! - `dto.rs`: response schemas
//! - `errors.rs`: the error boundary

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod envelope;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Resource routes are mounted under `api_prefix` (`""` mounts them at the
/// root); `/healthz` always sits at the root.
pub fn build_app(services: Arc<AppServices>, api_prefix: &str) -> Router {
    let api = routes::router();
    let app = if api_prefix.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(api_prefix, api)
    };

    app.route("/healthz", get(routes::system::health))
        .fallback(errors::route_not_found)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::http_trace_layer())
                .layer(middleware::catch_panic_layer()),
        )
}
