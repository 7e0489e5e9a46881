pub mod addresses;
pub mod carts;
pub mod catalog;
pub mod common;
pub mod customers;
pub mod images;
pub mod orders;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    AddressService, CartService, CatalogService, CustomerService, OrderService,
};

/// All services, wired to the shared pool and event channel
#[derive(Clone)]
pub struct AppServices {
    pub addresses: Arc<AddressService>,
    pub carts: Arc<CartService>,
    pub catalog: Arc<CatalogService>,
    pub customers: Arc<CustomerService>,
    pub orders: Arc<OrderService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            addresses: Arc::new(AddressService::new(db_pool.clone(), event_sender.clone())),
            carts: Arc::new(CartService::new(db_pool.clone(), event_sender.clone())),
            catalog: Arc::new(CatalogService::new(db_pool.clone(), event_sender.clone())),
            customers: Arc::new(CustomerService::new(db_pool.clone(), event_sender.clone())),
            orders: Arc::new(OrderService::new(db_pool, event_sender)),
        }
    }
}
