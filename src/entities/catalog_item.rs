use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog item entity; purchasable configurations live in `variant`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_catalog")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub item_id: i64,
    pub item_name: String,
    pub description: String,
    pub category: String,
    #[sea_orm(nullable)]
    pub item_image: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::variant::Entity")]
    Variants,
}

impl Related<super::variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
