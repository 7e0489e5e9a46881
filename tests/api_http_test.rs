mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

fn register_body(email: &str) -> serde_json::Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": email,
        "password": "pw",
        "phone_number": "555-0100",
        "shipping_address": {
            "street": "1 Main St",
            "city": "Fairbanks",
            "state": "AK",
            "zip": "99701"
        }
    })
}

#[tokio::test]
async fn register_creates_a_customer_and_rejects_duplicate_emails() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/customers/register",
            Some(register_body("ada@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let customer_id = body["customer"].as_i64().expect("customer id");

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/customers/register",
            Some(register_body("ada@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already registered"));

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{customer_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    // the stored password never leaves the server
    assert!(body.get("password").is_none());
    assert!(body["shipping_address"].as_i64().is_some());
}

#[tokio::test]
async fn registrations_share_equal_address_rows() {
    let app = TestApp::new().await;

    let (_, ada) = app
        .request_json(
            Method::POST,
            "/api/v1/customers/register",
            Some(register_body("ada@example.com")),
        )
        .await;
    let (_, grace) = app
        .request_json(
            Method::POST,
            "/api/v1/customers/register",
            Some(register_body("grace@example.com")),
        )
        .await;

    let (_, ada) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{}", ada["customer"]),
            None,
        )
        .await;
    let (_, grace) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{}", grace["customer"]),
            None,
        )
        .await;
    assert_eq!(ada["shipping_address"], grace["shipping_address"]);
}

#[tokio::test]
async fn login_reports_success_and_failure() {
    let app = TestApp::new().await;
    app.request_json(
        Method::POST,
        "/api/v1/customers/register",
        Some(register_body("ada@example.com")),
    )
    .await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/customers/login",
            Some(json!({"email": "ada@example.com", "password": "pw"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/customers/login",
            Some(json!({"email": "ada@example.com", "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_customer_is_a_404() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request_json(Method::GET, "/api/v1/customers/404", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn address_endpoint_deduplicates_by_value() {
    let app = TestApp::new().await;
    let body = json!({
        "street": "1 Main St",
        "city": "Fairbanks",
        "state": "AK",
        "zip": "99701"
    });

    let (status, first) = app
        .request_json(Method::POST, "/api/v1/addresses", Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, second) = app
        .request_json(Method::POST, "/api/v1/addresses", Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["address"], second["address"]);
}

#[tokio::test]
async fn address_edit_endpoint_validates_the_slot_name() {
    let app = TestApp::new().await;
    let (_, created) = app
        .request_json(
            Method::POST,
            "/api/v1/customers/register",
            Some(register_body("ada@example.com")),
        )
        .await;
    let id = created["customer"].as_i64().unwrap();

    let (status, body) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/customers/{id}/addresses/shipping"),
            Some(json!({"street": "9 Elm St"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["address"].as_i64().is_some());

    let (status, _) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/customers/{id}/addresses/postal"),
            Some(json!({"street": "9 Elm St"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalog_round_trip_over_http() {
    let app = TestApp::new().await;

    let (status, created) = app
        .request_json(
            Method::POST,
            "/api/v1/catalog",
            Some(json!({
                "item_name": "Kent Shirt",
                "description": "A fine shirt",
                "category": "shirt",
                "variants": [
                    {"size": "M", "color": "Blue", "price": "19.95", "weight": 1.07, "stock": 3}
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = created["item"].as_i64().unwrap();

    let (status, item) = app
        .request_json(Method::GET, &format!("/api/v1/catalog/{item_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["item_name"], "Kent Shirt");
    assert_eq!(item["variants"].as_array().unwrap().len(), 1);

    let (status, variant) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/catalog/{item_id}/variants"),
            Some(json!({"size": "L", "color": "Green", "price": "20.95", "weight": 1.24, "stock": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(variant["variant"], 2);

    let (status, _) = app
        .request_json(Method::GET, "/api/v1/catalog/404", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_endpoint_filters_and_rejects_unknown_names() {
    let app = TestApp::new().await;
    app.seed_catalog().await;

    let (status, results) = app
        .request_json(
            Method::POST,
            "/api/v1/catalog/search",
            Some(json!({"category": "shirt", "instock": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results.as_array().unwrap().len(), 2);

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/catalog/search",
            Some(json!({"colour": "red"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("colour"));
}

#[tokio::test]
async fn image_metadata_round_trip() {
    let app = TestApp::new().await;

    let (status, created) = app
        .request_json(
            Method::POST,
            "/api/v1/images",
            Some(json!({"mime_type": "image/png", "alt_text": "a shirt"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let image_id = created["image"].as_i64().unwrap();

    let (status, image) = app
        .request_json(Method::GET, &format!("/api/v1/images/{image_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(image["mime_type"], "image/png");

    let (status, _) = app
        .request_json(Method::GET, "/api/v1/images/404", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cart_and_checkout_over_http() {
    let app = TestApp::new().await;
    let (shirt, _) = app.seed_catalog().await;
    let (_, created) = app
        .request_json(
            Method::POST,
            "/api/v1/customers/register",
            Some(register_body("ada@example.com")),
        )
        .await;
    let customer = created["customer"].as_i64().unwrap();

    let status = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{customer}/items"),
            Some(json!({"item_id": shirt, "variant_id": 1, "quantity": 2})),
        )
        .await
        .status();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, items) = app
        .request_json(Method::GET, &format!("/api/v1/carts/{customer}/items"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 1);

    let (status, summary) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/carts/{customer}/summary"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["lines"], 1);

    let (status, placed) = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({"customer_id": customer})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = placed["order"].as_i64().unwrap();

    let (status, order) = app
        .request_json(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "ordered");

    let (status, lines) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/orders/{order_id}/items"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lines.as_array().unwrap().len(), 1);

    let (status, orders) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{customer}/orders"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);

    // the cart is cleared by checkout
    let (_, items) = app
        .request_json(Method::GET, &format!("/api/v1/carts/{customer}/items"), None)
        .await;
    assert!(items.as_array().unwrap().is_empty());

    let status = app
        .request(
            Method::DELETE,
            &format!("/api/v1/carts/{customer}/items"),
            None,
        )
        .await
        .status();
    assert_eq!(status, StatusCode::NO_CONTENT);
}
