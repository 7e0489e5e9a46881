use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::common::{map_service_error, no_content_response, success_response};
use crate::errors::ApiError;
use crate::services::carts::CartItemInput;
use crate::AppState;

/// Which row to remove. Both ids absent means "clear the cart".
#[derive(Debug, Deserialize)]
pub struct RemoveItemParams {
    pub item_id: Option<i64>,
    pub variant_id: Option<i64>,
}

async fn get_items(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .carts
        .get_items(customer_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
    Json(payload): Json<CartItemInput>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .carts
        .add_item(customer_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
    Query(params): Query<RemoveItemParams>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .carts
        .remove_item(customer_id, params.item_id, params.variant_id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

async fn cart_summary(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .carts
        .summary(customer_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(summary))
}

pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/:customer_id/items",
            get(get_items).post(add_item).delete(remove_item),
        )
        .route("/:customer_id/summary", get(cart_summary))
}
