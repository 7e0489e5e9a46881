use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::common::{created_response, map_service_error, success_response};
use crate::errors::ApiError;
use crate::services::catalog::NewImage;
use crate::AppState;

async fn create_image(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewImage>,
) -> Result<impl IntoResponse, ApiError> {
    let image_id = state
        .services
        .catalog
        .create_image(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(json!({ "image": image_id })))
}

async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let image = state
        .services
        .catalog
        .get_image(image_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(image))
}

pub fn image_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_image))
        .route("/:image_id", get(get_image))
}
