use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub customer_id: i64,
    pub first_name: String,
    #[sea_orm(nullable)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[sea_orm(nullable)]
    pub shipping_address: Option<i64>,
    #[sea_orm(nullable)]
    pub billing_address: Option<i64>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub phone_number: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::address::Entity",
        from = "Column::ShippingAddress",
        to = "super::address::Column::AddressId"
    )]
    ShippingAddress,
    #[sea_orm(
        belongs_to = "super::address::Entity",
        from = "Column::BillingAddress",
        to = "super::address::Column::AddressId"
    )]
    BillingAddress,
}

impl ActiveModelBehavior for ActiveModel {}
