use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Set, Statement, TransactionTrait,
};
use serde::Serialize;
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::{cart_item, customer, order, order_item};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::carts;

/// One order line joined with its catalog data
#[derive(Debug, Serialize, FromQueryResult)]
pub struct OrderLine {
    pub item_id: i64,
    pub variant_id: i64,
    pub item_name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price: Decimal,
    pub weight: f64,
    pub quantity: i32,
    pub image_id: Option<i64>,
}

const ORDER_LINES_SQL: &str = "SELECT oi.item_id, oi.variant_id, i.item_name, v.size, v.color, \
     v.price, v.weight, oi.quantity, \
     COALESCE(v.variant_image, i.item_image) AS image_id \
     FROM order_item oi \
     INNER JOIN variant_catalog v \
        ON v.item_id = oi.item_id AND v.variant_id = oi.variant_id \
     INNER JOIN item_catalog i ON i.item_id = oi.item_id \
     WHERE oi.order_id = ? \
     ORDER BY oi.item_id, oi.variant_id";

/// Service for placing and inspecting orders
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Checks out the customer's cart as an order, in one transaction:
    /// totals are computed from the cart, the order row is inserted with
    /// the customer's current address ids as a snapshot, cart rows are
    /// copied to order lines and deleted, and the status is stamped
    /// `ordered` last. An empty cart still yields an (empty) order.
    #[instrument(skip(self))]
    pub async fn place_order(&self, customer_id: i64) -> Result<i64, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let owner = customer::Entity::find_by_id(customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Customer".to_string()))?;

        let lines = carts::load_cart_lines(&txn, customer_id).await?;
        let (total_price, total_weight) = carts::cart_totals(&lines);

        let placed = order::ActiveModel {
            customer_id: Set(customer_id),
            shipping_address: Set(owner.shipping_address),
            billing_address: Set(owner.billing_address),
            total_price: Set(total_price),
            total_weight: Set(total_weight),
            status: Set(None),
            order_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if !lines.is_empty() {
            let rows = lines.iter().map(|l| order_item::ActiveModel {
                order_id: Set(placed.order_id),
                item_id: Set(l.item_id),
                variant_id: Set(l.variant_id),
                quantity: Set(l.quantity),
            });
            order_item::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await?;
        }

        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .exec(&txn)
            .await?;

        let order_id = placed.order_id;
        let mut active: order::ActiveModel = placed.into();
        active.status = Set(Some("ordered".to_string()));
        active.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderPlaced(order_id))
            .await;
        Ok(order_id)
    }

    /// Lists a customer's orders
    #[instrument(skip(self))]
    pub async fn list_orders(&self, customer_id: i64) -> Result<Vec<order::Model>, ServiceError> {
        let orders = order::Entity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .order_by_asc(order::Column::OrderId)
            .all(&*self.db_pool)
            .await?;
        Ok(orders)
    }

    /// Gets an order by id
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i64) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(order_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order".to_string()))
    }

    /// Lists an order's lines joined with catalog data
    #[instrument(skip(self))]
    pub async fn list_order_items(&self, order_id: i64) -> Result<Vec<OrderLine>, ServiceError> {
        let db = &*self.db_pool;
        order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order".to_string()))?;

        let rows = OrderLine::find_by_statement(Statement::from_sql_and_values(
            db.get_database_backend(),
            ORDER_LINES_SQL,
            [order_id.into()],
        ))
        .all(db)
        .await?;
        Ok(rows)
    }
}
