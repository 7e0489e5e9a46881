use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog item variant: a specific purchasable size/color configuration.
/// Identity is the `(item_id, variant_id)` pair; `variant_image` overrides
/// the parent item's image when set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "variant_catalog")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub variant_id: i64,
    #[sea_orm(nullable)]
    pub size: Option<String>,
    #[sea_orm(nullable)]
    pub color: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub price: Decimal,
    pub weight: f64,
    pub stock: i32,
    #[sea_orm(nullable)]
    pub variant_image: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::catalog_item::Entity",
        from = "Column::ItemId",
        to = "super::catalog_item::Column::ItemId"
    )]
    Item,
}

impl Related<super::catalog_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
