use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use kstores_api::config::AppConfig;
use kstores_api::db;
use kstores_api::events::{self, EventSender};
use kstores_api::services::catalog::{NewCatalogItem, NewVariant};
use kstores_api::{api_v1_routes, AppState};

/// Helper harness spinning up the full application state backed by an
/// in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Constructs a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 18_080, "test");
        // a single pooled connection keeps the in-memory database alive
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));
        let event_sender = Arc::new(EventSender::new(event_tx));

        let state = Arc::new(AppState::new(db_arc, cfg, event_sender));

        let router = Router::new()
            .route("/health", get(|| async { "OK" }))
            .nest("/api/v1", api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Sends a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };
        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON response body.
    #[allow(dead_code)]
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not valid json")
        };
        (status, value)
    }

    /// Seeds a small fixture catalog and returns `(shirt_id, mug_id)`.
    ///
    /// Five variants total, three of them in stock.
    #[allow(dead_code)]
    pub async fn seed_catalog(&self) -> (i64, i64) {
        let catalog = &self.state.services.catalog;

        let shirt_id = catalog
            .create_item(NewCatalogItem {
                item_name: "Kent Shirt".to_string(),
                description: "A fine shirt".to_string(),
                category: "shirt".to_string(),
                variants: vec![
                    fixture_variant(Some("M"), Some("Blue"), "19.95", 1.07, 3),
                    fixture_variant(Some("L"), Some("Green"), "20.95", 1.24, 0),
                    fixture_variant(Some("XS"), Some("Green"), "18.65", 0.92, 5),
                ],
            })
            .await
            .expect("failed to seed shirt");

        let mug_id = catalog
            .create_item(NewCatalogItem {
                item_name: "Logo Mug".to_string(),
                description: "A mug with a logo".to_string(),
                category: "mug".to_string(),
                variants: vec![
                    fixture_variant(None, Some("White"), "8.50", 0.80, 10),
                    fixture_variant(None, Some("Red"), "8.50", 0.80, 0),
                ],
            })
            .await
            .expect("failed to seed mug");

        (shirt_id, mug_id)
    }
}

#[allow(dead_code)]
fn fixture_variant(
    size: Option<&str>,
    color: Option<&str>,
    price: &str,
    weight: f64,
    stock: i32,
) -> NewVariant {
    NewVariant {
        variant_id: None,
        size: size.map(str::to_string),
        color: color.map(str::to_string),
        price: price.parse::<Decimal>().expect("fixture price"),
        weight,
        stock,
        variant_image: None,
    }
}
