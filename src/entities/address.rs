use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Address entity. Rows are shared by value: several customers (and past
/// orders) may reference the same address id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "address")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub address_id: i64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
