use axum::Router;

pub mod coffees;
pub mod system;

/// Router for the resource endpoints, mounted under the API prefix.
pub fn router() -> Router {
    Router::new().nest("/coffees", coffees::router())
}
