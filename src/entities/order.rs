use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order entity. Address ids and totals are snapshots taken at checkout;
/// later edits to the customer's addresses must not affect them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub order_id: i64,
    pub customer_id: i64,
    #[sea_orm(nullable)]
    pub shipping_address: Option<i64>,
    #[sea_orm(nullable)]
    pub billing_address: Option<i64>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_price: Decimal,
    pub total_weight: f64,
    #[sea_orm(nullable)]
    pub status: Option<String>,
    pub order_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::CustomerId"
    )]
    Customer,
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
