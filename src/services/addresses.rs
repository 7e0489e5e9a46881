use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{address, customer, order};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Which of a customer's two address slots an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Shipping,
    Billing,
}

impl FromStr for AddressType {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shipping" => Ok(AddressType::Shipping),
            "billing" => Ok(AddressType::Billing),
            other => Err(ServiceError::InvalidInput(format!(
                "unknown address type: {other}"
            ))),
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressType::Shipping => write!(f, "shipping"),
            AddressType::Billing => write!(f, "billing"),
        }
    }
}

/// Full address value for creation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAddress {
    #[validate(length(min = 1))]
    pub street: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(min = 1))]
    pub zip: String,
}

/// Partial address edit. Absent fields keep their current value; a patch
/// with no fields at all is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl AddressPatch {
    pub fn is_empty(&self) -> bool {
        self.street.is_none() && self.city.is_none() && self.state.is_none() && self.zip.is_none()
    }
}

/// Service for managing shared address rows
#[derive(Clone)]
pub struct AddressService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl AddressService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates an address, deduplicating by value: an existing row with the
    /// same four fields is returned (lowest id first) instead of inserting.
    #[instrument(skip(self, fields))]
    pub async fn create_address(&self, fields: NewAddress) -> Result<i64, ServiceError> {
        fields.validate()?;
        let (address_id, created) = resolve_or_insert(&*self.db_pool, &fields).await?;
        if created {
            self.event_sender
                .send_or_log(Event::AddressCreated(address_id))
                .await;
        }
        Ok(address_id)
    }

    /// Edits the customer's shipping or billing address.
    ///
    /// If the current row is referenced anywhere else (another customer,
    /// this customer's other slot, or a past order) the edit clones the row
    /// and repoints only this customer's slot, leaving the original intact.
    /// An unshared row is mutated in place. The sharing check and the write
    /// run in one transaction.
    #[instrument(skip(self, patch))]
    pub async fn update_customer_address(
        &self,
        customer_id: i64,
        address_type: AddressType,
        patch: AddressPatch,
    ) -> Result<i64, ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::InvalidInput(
                "address patch contains no fields".to_string(),
            ));
        }

        let txn = self.db_pool.begin().await?;

        let owner = customer::Entity::find_by_id(customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Customer".to_string()))?;
        let address_id = match address_type {
            AddressType::Shipping => owner.shipping_address,
            AddressType::Billing => owner.billing_address,
        }
        .ok_or_else(|| ServiceError::NotFound("Address".to_string()))?;
        let current = address::Entity::find_by_id(address_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Address".to_string()))?;

        let resolved = if is_shared(&txn, &owner, address_type, address_id).await? {
            let target = NewAddress {
                street: patch.street.unwrap_or_else(|| current.street.clone()),
                city: patch.city.unwrap_or_else(|| current.city.clone()),
                state: patch.state.unwrap_or_else(|| current.state.clone()),
                zip: patch.zip.unwrap_or_else(|| current.zip.clone()),
            };
            let (new_id, _) = resolve_or_insert(&txn, &target).await?;
            let mut active: customer::ActiveModel = owner.into();
            match address_type {
                AddressType::Shipping => active.shipping_address = Set(Some(new_id)),
                AddressType::Billing => active.billing_address = Set(Some(new_id)),
            }
            active.update(&txn).await?;
            new_id
        } else {
            let mut active: address::ActiveModel = current.into();
            if let Some(street) = patch.street {
                active.street = Set(street);
            }
            if let Some(city) = patch.city {
                active.city = Set(city);
            }
            if let Some(state) = patch.state {
                active.state = Set(state);
            }
            if let Some(zip) = patch.zip {
                active.zip = Set(zip);
            }
            active.update(&txn).await?;
            address_id
        };

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::AddressRewritten {
                customer_id,
                address_id: resolved,
            })
            .await;
        Ok(resolved)
    }
}

/// Returns the id of an existing row matching all four fields, inserting a
/// new row only when none exists. The bool reports whether an insert
/// happened. Works inside or outside a transaction.
pub(crate) async fn resolve_or_insert<C: ConnectionTrait>(
    conn: &C,
    fields: &NewAddress,
) -> Result<(i64, bool), ServiceError> {
    let existing = address::Entity::find()
        .filter(address::Column::Street.eq(&fields.street))
        .filter(address::Column::City.eq(&fields.city))
        .filter(address::Column::State.eq(&fields.state))
        .filter(address::Column::Zip.eq(&fields.zip))
        .order_by_asc(address::Column::AddressId)
        .one(conn)
        .await?;
    if let Some(row) = existing {
        return Ok((row.address_id, false));
    }

    let inserted = address::ActiveModel {
        street: Set(fields.street.clone()),
        city: Set(fields.city.clone()),
        state: Set(fields.state.clone()),
        zip: Set(fields.zip.clone()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok((inserted.address_id, true))
}

/// True when anything other than the owner's targeted slot references the
/// address: another customer's slot, the owner's other slot, or an order
/// snapshot.
async fn is_shared<C: ConnectionTrait>(
    conn: &C,
    owner: &customer::Model,
    address_type: AddressType,
    address_id: i64,
) -> Result<bool, ServiceError> {
    let other_customers = customer::Entity::find()
        .filter(customer::Column::CustomerId.ne(owner.customer_id))
        .filter(
            Condition::any()
                .add(customer::Column::ShippingAddress.eq(address_id))
                .add(customer::Column::BillingAddress.eq(address_id)),
        )
        .count(conn)
        .await?;
    if other_customers > 0 {
        return Ok(true);
    }

    let own_other_slot = match address_type {
        AddressType::Shipping => owner.billing_address == Some(address_id),
        AddressType::Billing => owner.shipping_address == Some(address_id),
    };
    if own_other_slot {
        return Ok(true);
    }

    let order_refs = order::Entity::find()
        .filter(
            Condition::any()
                .add(order::Column::ShippingAddress.eq(address_id))
                .add(order::Column::BillingAddress.eq(address_id)),
        )
        .count(conn)
        .await?;
    Ok(order_refs > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_type_parses_both_slots() {
        assert_eq!("shipping".parse::<AddressType>().unwrap(), AddressType::Shipping);
        assert_eq!("billing".parse::<AddressType>().unwrap(), AddressType::Billing);
        assert!("postal".parse::<AddressType>().is_err());
    }

    #[test]
    fn address_type_round_trips_through_display() {
        for t in [AddressType::Shipping, AddressType::Billing] {
            assert_eq!(t.to_string().parse::<AddressType>().unwrap(), t);
        }
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(AddressPatch::default().is_empty());
        let patch = AddressPatch {
            zip: Some("99701".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
