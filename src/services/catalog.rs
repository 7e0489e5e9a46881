use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::db::search::{build_search_sql, FilterValue};
use crate::db::DbPool;
use crate::entities::{catalog_image, catalog_item, variant};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// New catalog item with its initial variants
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCatalogItem {
    #[validate(length(min = 1))]
    pub item_name: String,
    pub description: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[serde(default)]
    pub variants: Vec<NewVariant>,
}

/// A variant to add. `variant_id` is only honored when adding to an
/// existing item; batch creation numbers variants itself.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVariant {
    pub variant_id: Option<i64>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price: Decimal,
    pub weight: f64,
    #[serde(default)]
    pub stock: i32,
    pub variant_image: Option<i64>,
}

/// New image metadata row
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewImage {
    #[validate(length(min = 1))]
    pub mime_type: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogItemDetail {
    pub item_id: i64,
    pub item_name: String,
    pub description: String,
    pub category: String,
    pub variants: Vec<VariantDetail>,
}

#[derive(Debug, Serialize)]
pub struct VariantDetail {
    pub variant_id: i64,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price: Decimal,
    pub weight: f64,
    pub stock: i32,
    pub image: Option<i64>,
}

/// Composite identity of a search hit
#[derive(Debug, Serialize)]
pub struct VariantKey {
    pub item: i64,
    pub variant: i64,
}

/// One catalog search result row
#[derive(Debug, Serialize)]
pub struct ItemVariantRecord {
    pub id: VariantKey,
    pub name: String,
    pub category: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price: Decimal,
    pub weight: f64,
    pub image: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
struct SearchRow {
    item_id: i64,
    variant_id: i64,
    item_name: String,
    category: String,
    size: Option<String>,
    color: Option<String>,
    price: Decimal,
    weight: f64,
    image_id: Option<i64>,
}

impl From<SearchRow> for ItemVariantRecord {
    fn from(row: SearchRow) -> Self {
        ItemVariantRecord {
            id: VariantKey {
                item: row.item_id,
                variant: row.variant_id,
            },
            name: row.item_name,
            category: row.category,
            size: row.size,
            color: row.color,
            price: row.price,
            weight: row.weight,
            image: row.image_id,
        }
    }
}

/// Service for managing the item catalog
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a catalog item with its variants, numbered from 1, in one
    /// transaction.
    #[instrument(skip(self, item))]
    pub async fn create_item(&self, item: NewCatalogItem) -> Result<i64, ServiceError> {
        item.validate()?;

        let txn = self.db_pool.begin().await?;
        let inserted = catalog_item::ActiveModel {
            item_name: Set(item.item_name),
            description: Set(item.description),
            category: Set(item.category),
            item_image: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (i, v) in item.variants.into_iter().enumerate() {
            insert_variant(&txn, inserted.item_id, i as i64 + 1, v).await?;
        }
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CatalogItemCreated(inserted.item_id))
            .await;
        Ok(inserted.item_id)
    }

    /// Adds a variant to an existing item. Without an explicit id the next
    /// one is `MAX(variant_id)+1`, or 0 for an item with no variants yet
    /// (batch creation numbers from 1).
    #[instrument(skip(self, new_variant))]
    pub async fn create_variant(
        &self,
        item_id: i64,
        new_variant: NewVariant,
    ) -> Result<i64, ServiceError> {
        let txn = self.db_pool.begin().await?;
        catalog_item::Entity::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Catalog item".to_string()))?;

        let variant_id = match new_variant.variant_id {
            Some(id) => id,
            None => {
                let max: Option<Option<i64>> = variant::Entity::find()
                    .select_only()
                    .column_as(variant::Column::VariantId.max(), "max_id")
                    .filter(variant::Column::ItemId.eq(item_id))
                    .into_tuple()
                    .one(&txn)
                    .await?;
                max.flatten().map(|m| m + 1).unwrap_or(0)
            }
        };

        insert_variant(&txn, item_id, variant_id, new_variant).await?;
        txn.commit().await?;
        Ok(variant_id)
    }

    /// Gets an item with all its variants; each variant's image falls back
    /// to the item's image when it has none of its own.
    #[instrument(skip(self))]
    pub async fn get_item(&self, item_id: i64) -> Result<CatalogItemDetail, ServiceError> {
        let db = &*self.db_pool;
        let item = catalog_item::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Catalog item".to_string()))?;
        let variants = variant::Entity::find()
            .filter(variant::Column::ItemId.eq(item_id))
            .order_by_asc(variant::Column::VariantId)
            .all(db)
            .await?;

        Ok(CatalogItemDetail {
            item_id: item.item_id,
            item_name: item.item_name,
            description: item.description,
            category: item.category,
            variants: variants
                .into_iter()
                .map(|v| VariantDetail {
                    variant_id: v.variant_id,
                    size: v.size,
                    color: v.color,
                    price: v.price,
                    weight: v.weight,
                    stock: v.stock,
                    image: v.variant_image.or(item.item_image),
                })
                .collect(),
        })
    }

    /// Runs a catalog search from a filter map. The statement is built by
    /// the filter table and executed as one parameterized query.
    #[instrument(skip(self, filters))]
    pub async fn search_catalog(
        &self,
        filters: &BTreeMap<String, FilterValue>,
    ) -> Result<Vec<ItemVariantRecord>, ServiceError> {
        let (sql, params) = build_search_sql(filters)?;
        let db = &*self.db_pool;
        let rows = SearchRow::find_by_statement(Statement::from_sql_and_values(
            db.get_database_backend(),
            &sql,
            params,
        ))
        .all(db)
        .await?;
        Ok(rows.into_iter().map(ItemVariantRecord::from).collect())
    }

    /// Creates an image metadata row
    #[instrument(skip(self, image))]
    pub async fn create_image(&self, image: NewImage) -> Result<i64, ServiceError> {
        image.validate()?;
        let inserted = catalog_image::ActiveModel {
            mime_type: Set(image.mime_type),
            alt_text: Set(image.alt_text),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;
        Ok(inserted.image_id)
    }

    /// Gets image metadata by id
    #[instrument(skip(self))]
    pub async fn get_image(&self, image_id: i64) -> Result<catalog_image::Model, ServiceError> {
        catalog_image::Entity::find_by_id(image_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Image".to_string()))
    }
}

async fn insert_variant<C: ConnectionTrait>(
    conn: &C,
    item_id: i64,
    variant_id: i64,
    v: NewVariant,
) -> Result<(), ServiceError> {
    // composite key, so the insert cannot return a last-insert id
    variant::Entity::insert(variant::ActiveModel {
        item_id: Set(item_id),
        variant_id: Set(variant_id),
        size: Set(v.size),
        color: Set(v.color),
        price: Set(v.price),
        weight: Set(v.weight),
        stock: Set(v.stock),
        variant_image: Set(v.variant_image),
    })
    .exec_without_returning(conn)
    .await?;
    Ok(())
}
