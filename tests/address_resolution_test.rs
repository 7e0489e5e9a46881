mod common;

use assert_matches::assert_matches;
use sea_orm::{EntityTrait, PaginatorTrait};

use common::TestApp;
use kstores_api::entities::address;
use kstores_api::errors::ServiceError;
use kstores_api::services::addresses::{AddressPatch, AddressType, NewAddress};
use kstores_api::services::customers::NewCustomer;

fn fairbanks(street: &str) -> NewAddress {
    NewAddress {
        street: street.to_string(),
        city: "Fairbanks".to_string(),
        state: "AK".to_string(),
        zip: "99701".to_string(),
    }
}

async fn create_address(app: &TestApp, street: &str) -> i64 {
    app.state
        .services
        .addresses
        .create_address(fairbanks(street))
        .await
        .expect("create address")
}

async fn register(
    app: &TestApp,
    email: &str,
    shipping: Option<i64>,
    billing: Option<i64>,
) -> i64 {
    app.state
        .services
        .customers
        .register_customer(NewCustomer {
            first_name: "Ada".to_string(),
            middle_name: None,
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
            phone_number: "555-0100".to_string(),
            shipping_address: shipping,
            billing_address: billing,
        })
        .await
        .expect("register customer")
}

async fn address_row(app: &TestApp, id: i64) -> address::Model {
    address::Entity::find_by_id(id)
        .one(&*app.state.db)
        .await
        .expect("query address")
        .expect("address row")
}

async fn address_count(app: &TestApp) -> u64 {
    address::Entity::find()
        .count(&*app.state.db)
        .await
        .expect("count addresses")
}

fn street_patch(street: &str) -> AddressPatch {
    AddressPatch {
        street: Some(street.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_is_idempotent_by_value() {
    let app = TestApp::new().await;

    let first = create_address(&app, "1 Main St").await;
    let second = create_address(&app, "1 Main St").await;
    assert_eq!(first, second);
    assert_eq!(address_count(&app).await, 1);

    let other = create_address(&app, "2 Main St").await;
    assert_ne!(first, other);
    assert_eq!(address_count(&app).await, 2);
}

#[tokio::test]
async fn unshared_edit_mutates_in_place() {
    let app = TestApp::new().await;
    let addr = create_address(&app, "1 Main St").await;
    let customer = register(&app, "ada@example.com", Some(addr), None).await;

    let result = app
        .state
        .services
        .addresses
        .update_customer_address(customer, AddressType::Shipping, street_patch("9 Elm St"))
        .await
        .expect("update address");

    assert_eq!(result, addr);
    assert_eq!(address_count(&app).await, 1);
    let row = address_row(&app, addr).await;
    assert_eq!(row.street, "9 Elm St");
    assert_eq!(row.city, "Fairbanks");
}

#[tokio::test]
async fn own_other_slot_reference_forces_clone() {
    let app = TestApp::new().await;
    let addr = create_address(&app, "1 Main St").await;
    let customer = register(&app, "ada@example.com", Some(addr), Some(addr)).await;

    let result = app
        .state
        .services
        .addresses
        .update_customer_address(customer, AddressType::Shipping, street_patch("9 Elm St"))
        .await
        .expect("update address");

    assert_ne!(result, addr);
    // billing still points at the untouched original
    let owner = app
        .state
        .services
        .customers
        .get_customer(customer)
        .await
        .expect("customer");
    assert_eq!(owner.shipping_address, Some(result));
    assert_eq!(owner.billing_address, Some(addr));
    assert_eq!(address_row(&app, addr).await.street, "1 Main St");
    assert_eq!(address_row(&app, result).await.street, "9 Elm St");
}

#[tokio::test]
async fn address_shared_across_customers_is_cloned() {
    let app = TestApp::new().await;

    // both registrations resolve to the same stored row
    let first_addr = create_address(&app, "1 Main St").await;
    let second_addr = create_address(&app, "1 Main St").await;
    assert_eq!(first_addr, second_addr);

    let ada = register(&app, "ada@example.com", Some(first_addr), None).await;
    let grace = register(&app, "grace@example.com", Some(second_addr), None).await;

    let new_id = app
        .state
        .services
        .addresses
        .update_customer_address(ada, AddressType::Shipping, street_patch("9 Elm St"))
        .await
        .expect("update address");

    assert_ne!(new_id, first_addr);

    let cloned = address_row(&app, new_id).await;
    assert_eq!(cloned.street, "9 Elm St");
    assert_eq!(cloned.city, "Fairbanks");
    assert_eq!(cloned.zip, "99701");

    // the other customer's view is unchanged
    let grace_row = app
        .state
        .services
        .customers
        .get_customer(grace)
        .await
        .expect("customer");
    assert_eq!(grace_row.shipping_address, Some(first_addr));
    assert_eq!(address_row(&app, first_addr).await.street, "1 Main St");
}

#[tokio::test]
async fn order_snapshot_reference_forces_clone() {
    let app = TestApp::new().await;
    let addr = create_address(&app, "1 Main St").await;
    let customer = register(&app, "ada@example.com", Some(addr), None).await;

    // an (empty) order snapshots the current address id
    let order_id = app
        .state
        .services
        .orders
        .place_order(customer)
        .await
        .expect("place order");

    let new_id = app
        .state
        .services
        .addresses
        .update_customer_address(customer, AddressType::Shipping, street_patch("9 Elm St"))
        .await
        .expect("update address");

    assert_ne!(new_id, addr);
    let order = app
        .state
        .services
        .orders
        .get_order(order_id)
        .await
        .expect("order");
    assert_eq!(order.shipping_address, Some(addr));
    assert_eq!(address_row(&app, addr).await.street, "1 Main St");
}

#[tokio::test]
async fn clone_resolves_to_an_existing_equal_row() {
    let app = TestApp::new().await;
    let shared = create_address(&app, "1 Main St").await;
    let existing = create_address(&app, "9 Elm St").await;

    let ada = register(&app, "ada@example.com", Some(shared), None).await;
    register(&app, "grace@example.com", Some(shared), None).await;

    let new_id = app
        .state
        .services
        .addresses
        .update_customer_address(ada, AddressType::Shipping, street_patch("9 Elm St"))
        .await
        .expect("update address");

    // the patched value already exists, so no third row appears
    assert_eq!(new_id, existing);
    assert_eq!(address_count(&app).await, 2);
}

#[tokio::test]
async fn empty_patch_is_rejected() {
    let app = TestApp::new().await;
    let addr = create_address(&app, "1 Main St").await;
    let customer = register(&app, "ada@example.com", Some(addr), None).await;

    let err = app
        .state
        .services
        .addresses
        .update_customer_address(customer, AddressType::Shipping, AddressPatch::default())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidInput(_));
}

#[tokio::test]
async fn missing_customer_or_unset_slot_is_not_found() {
    let app = TestApp::new().await;

    let err = app
        .state
        .services
        .addresses
        .update_customer_address(404, AddressType::Shipping, street_patch("9 Elm St"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let customer = register(&app, "ada@example.com", None, None).await;
    let err = app
        .state
        .services
        .addresses
        .update_customer_address(customer, AddressType::Billing, street_patch("9 Elm St"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}
