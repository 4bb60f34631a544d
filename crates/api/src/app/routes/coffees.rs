use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};

use roastery_coffee::{CoffeePatch, NewCoffee};
use roastery_core::{IdParams, PageRequest};

use crate::app::dto;
use crate::app::envelope::{self, SuccessEnvelope};
use crate::app::errors::{self, AppResult};
use crate::app::extract::{ValidJson, ValidPath, ValidQuery};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_coffees)
                .post(create_coffee)
                .fallback(errors::method_not_allowed),
        )
        .route(
            "/:id",
            get(get_coffee)
                .patch(update_coffee)
                .delete(delete_coffee)
                .fallback(errors::method_not_allowed),
        )
}

pub async fn list_coffees(
    Extension(services): Extension<Arc<AppServices>>,
    ValidQuery(page): ValidQuery<PageRequest>,
) -> AppResult<Response> {
    let result = services.coffees.list(page).await?;
    let body = SuccessEnvelope::with_meta(result.items, page.meta(result.total));
    envelope::respond(StatusCode::OK, dto::coffee_list_response_schema(), &body)
}

pub async fn get_coffee(
    Extension(services): Extension<Arc<AppServices>>,
    ValidPath(params): ValidPath<IdParams>,
) -> AppResult<Response> {
    let coffee = services.coffees.get(params.id.into()).await?;
    envelope::respond(StatusCode::OK, dto::coffee_response_schema(), &SuccessEnvelope::new(coffee))
}

pub async fn create_coffee(
    Extension(services): Extension<Arc<AppServices>>,
    ValidJson(input): ValidJson<NewCoffee>,
) -> AppResult<Response> {
    let coffee = services.coffees.create(input).await?;
    envelope::respond(StatusCode::CREATED, dto::coffee_response_schema(), &SuccessEnvelope::new(coffee))
}

pub async fn update_coffee(
    Extension(services): Extension<Arc<AppServices>>,
    ValidPath(params): ValidPath<IdParams>,
    ValidJson(patch): ValidJson<CoffeePatch>,
) -> AppResult<Response> {
    let coffee = services.coffees.update(params.id.into(), patch).await?;
    envelope::respond(StatusCode::OK, dto::coffee_response_schema(), &SuccessEnvelope::new(coffee))
}

/// Responds with the record as it was before removal.
pub async fn delete_coffee(
    Extension(services): Extension<Arc<AppServices>>,
    ValidPath(params): ValidPath<IdParams>,
) -> AppResult<Response> {
    let coffee = services.coffees.delete(params.id.into()).await?;
    envelope::respond(StatusCode::OK, dto::coffee_response_schema(), &SuccessEnvelope::new(coffee))
}
