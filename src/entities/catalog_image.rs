use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Image metadata entity. The file bytes themselves are stored elsewhere;
/// catalog rows reference these ids.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub image_id: i64,
    pub mime_type: String,
    #[sea_orm(nullable)]
    pub alt_text: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
