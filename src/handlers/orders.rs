use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::common::{created_response, map_service_error, success_response};
use crate::errors::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: i64,
}

async fn place_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = state
        .services
        .orders
        .place_order(payload.customer_id)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(json!({ "order": order_id })))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_order(order_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

async fn list_order_items(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .orders
        .list_order_items(order_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

pub fn order_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(place_order))
        .route("/:order_id", get(get_order))
        .route("/:order_id/items", get(list_order_items))
}
