use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, Set, Statement,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::cart_item;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Cart mutation input
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemInput {
    pub item_id: i64,
    pub variant_id: i64,
    pub quantity: i32,
}

/// One cart row joined with its catalog data
#[derive(Debug, Serialize, FromQueryResult)]
pub struct CartLine {
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

#[derive(Debug, Serialize)]
pub struct CartSummary {
    pub lines: usize,
    pub total_price: Decimal,
    pub total_weight: f64,
}

const CART_LINES_SQL: &str = "SELECT c.item_id, c.variant_id, i.item_name, v.size, v.color, \
     v.price, v.weight, c.quantity, \
     COALESCE(v.variant_image, i.item_image) AS image_id \
     FROM shopping_cart c \
     INNER JOIN variant_catalog v \
        ON v.item_id = c.item_id AND v.variant_id = c.variant_id \
     INNER JOIN item_catalog i ON i.item_id = c.item_id \
     WHERE c.customer_id = ? \
     ORDER BY c.item_id, c.variant_id";

/// Loads a customer's cart joined with catalog data. Checkout reads the
/// cart through this inside its own transaction.
pub(crate) async fn load_cart_lines<C: ConnectionTrait>(
    conn: &C,
    customer_id: i64,
) -> Result<Vec<CartLine>, ServiceError> {
    let rows = CartLine::find_by_statement(Statement::from_sql_and_values(
        conn.get_database_backend(),
        CART_LINES_SQL,
        [customer_id.into()],
    ))
    .all(conn)
    .await?;
    Ok(rows)
}

pub(crate) fn cart_totals(lines: &[CartLine]) -> (Decimal, f64) {
    let total_price = lines
        .iter()
        .map(|l| l.price * Decimal::from(l.quantity))
        .sum();
    let total_weight = lines.iter().map(|l| l.weight * f64::from(l.quantity)).sum();
    (total_price, total_weight)
}

/// Service for managing shopping carts
#[derive(Clone)]
pub struct CartService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Puts an item in the cart. Re-adding the same `(item, variant)` key
    /// overwrites the quantity; a quantity of zero or less removes the row.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        customer_id: i64,
        input: CartItemInput,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        if input.quantity <= 0 {
            cart_item::Entity::delete_many()
                .filter(cart_item::Column::CustomerId.eq(customer_id))
                .filter(cart_item::Column::ItemId.eq(input.item_id))
                .filter(cart_item::Column::VariantId.eq(input.variant_id))
                .exec(db)
                .await?;
        } else {
            cart_item::Entity::insert(cart_item::ActiveModel {
                customer_id: Set(customer_id),
                item_id: Set(input.item_id),
                variant_id: Set(input.variant_id),
                quantity: Set(input.quantity),
            })
            .on_conflict(
                OnConflict::columns([
                    cart_item::Column::CustomerId,
                    cart_item::Column::ItemId,
                    cart_item::Column::VariantId,
                ])
                .update_column(cart_item::Column::Quantity)
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        }

        self.event_sender
            .send_or_log(Event::CartUpdated(customer_id))
            .await;
        Ok(())
    }

    /// Removes one row when both ids are given; clears the whole cart when
    /// either is absent.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        customer_id: i64,
        item_id: Option<i64>,
        variant_id: Option<i64>,
    ) -> Result<(), ServiceError> {
        let mut delete =
            cart_item::Entity::delete_many().filter(cart_item::Column::CustomerId.eq(customer_id));
        if let (Some(item_id), Some(variant_id)) = (item_id, variant_id) {
            delete = delete
                .filter(cart_item::Column::ItemId.eq(item_id))
                .filter(cart_item::Column::VariantId.eq(variant_id));
        }
        delete.exec(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::CartUpdated(customer_id))
            .await;
        Ok(())
    }

    /// Lists the cart joined with catalog data
    #[instrument(skip(self))]
    pub async fn get_items(&self, customer_id: i64) -> Result<Vec<CartLine>, ServiceError> {
        load_cart_lines(&*self.db_pool, customer_id).await
    }

    /// Cart totals, weighted by line quantity
    #[instrument(skip(self))]
    pub async fn summary(&self, customer_id: i64) -> Result<CartSummary, ServiceError> {
        let lines = self.get_items(customer_id).await?;
        let (total_price, total_weight) = cart_totals(&lines);
        Ok(CartSummary {
            lines: lines.len(),
            total_price,
            total_weight,
        })
    }
}
