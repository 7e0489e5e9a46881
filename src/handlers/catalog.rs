use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::common::{created_response, map_service_error, success_response};
use crate::db::search::FilterValue;
use crate::errors::ApiError;
use crate::services::catalog::{NewCatalogItem, NewVariant};
use crate::AppState;

async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewCatalogItem>,
) -> Result<impl IntoResponse, ApiError> {
    let item_id = state
        .services
        .catalog
        .create_item(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(json!({ "item": item_id })))
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .catalog
        .get_item(item_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(item))
}

async fn create_variant(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
    Json(payload): Json<NewVariant>,
) -> Result<impl IntoResponse, ApiError> {
    let variant_id = state
        .services
        .catalog
        .create_variant(item_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(json!({ "variant": variant_id })))
}

/// Catalog search. The body is a flat map of filter name to value; an
/// unknown name is rejected with 400.
async fn search_catalog(
    State(state): State<Arc<AppState>>,
    Json(filters): Json<BTreeMap<String, FilterValue>>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .services
        .catalog
        .search_catalog(&filters)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(results))
}

pub fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_item))
        .route("/search", post(search_catalog))
        .route("/:item_id", get(get_item))
        .route("/:item_id/variants", post(create_variant))
}
