use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::errors::ApiError;
use crate::services::addresses::{AddressPatch, AddressType, NewAddress};
use crate::services::customers::NewCustomer;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterCustomerRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub phone_number: String,
    pub shipping_address: Option<NewAddress>,
    pub billing_address: Option<NewAddress>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Registers a customer. Supplied address values are resolved first, so
/// identical addresses are shared instead of duplicated.
async fn register_customer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let shipping_address = match payload.shipping_address {
        Some(fields) => Some(
            state
                .services
                .addresses
                .create_address(fields)
                .await
                .map_err(map_service_error)?,
        ),
        None => None,
    };
    let billing_address = match payload.billing_address {
        Some(fields) => Some(
            state
                .services
                .addresses
                .create_address(fields)
                .await
                .map_err(map_service_error)?,
        ),
        None => None,
    };

    let customer_id = state
        .services
        .customers
        .register_customer(NewCustomer {
            first_name: payload.first_name,
            middle_name: payload.middle_name,
            last_name: payload.last_name,
            email: payload.email,
            password: payload.password,
            phone_number: payload.phone_number,
            shipping_address,
            billing_address,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({ "customer": customer_id })))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let success = state
        .services
        .customers
        .check_login(&payload.email, &payload.password)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({ "success": success })))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state
        .services
        .customers
        .get_customer(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(customer))
}

/// Edits one of the customer's addresses, returning the id the customer's
/// slot now points at (a new id when the row had to be cloned).
async fn update_customer_address(
    State(state): State<Arc<AppState>>,
    Path((id, address_type)): Path<(i64, String)>,
    Json(patch): Json<AddressPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let address_type: AddressType = address_type.parse().map_err(map_service_error)?;
    let address_id = state
        .services
        .addresses
        .update_customer_address(id, address_type, patch)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({ "address": address_id })))
}

async fn list_customer_orders(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    // 404 for an unknown customer rather than an empty list
    state
        .services
        .customers
        .get_customer(id)
        .await
        .map_err(map_service_error)?;
    let orders = state
        .services
        .orders
        .list_orders(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}

pub fn customer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register_customer))
        .route("/login", post(login))
        .route("/:id", get(get_customer))
        .route("/:id/addresses/:address_type", put(update_customer_address))
        .route("/:id/orders", get(list_customer_orders))
}
