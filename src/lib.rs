pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use axum::Router;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::handlers::AppServices;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub event_sender: Arc<EventSender>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig, event_sender: Arc<EventSender>) -> Self {
        let services = AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// All versioned API routes, to be nested under `/api/v1`
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/customers", handlers::customers::customer_routes())
        .nest("/addresses", handlers::addresses::address_routes())
        .nest("/catalog", handlers::catalog::catalog_routes())
        .nest("/images", handlers::images::image_routes())
        .nest("/carts", handlers::carts::cart_routes())
        .nest("/orders", handlers::orders::order_routes())
}
