use std::sync::Arc;

use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde_json::json;

use super::common::{created_response, map_service_error};
use crate::errors::ApiError;
use crate::services::addresses::NewAddress;
use crate::AppState;

/// Creates an address, returning the existing id when the value is already
/// stored.
async fn create_address(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewAddress>,
) -> Result<impl IntoResponse, ApiError> {
    let address_id = state
        .services
        .addresses
        .create_address(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(json!({ "address": address_id })))
}

pub fn address_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(create_address))
}
