use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::customer;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Registration input. Address ids are resolved by the caller before the
/// customer row is inserted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCustomer {
    #[validate(length(min = 1))]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub phone_number: String,
    pub shipping_address: Option<i64>,
    pub billing_address: Option<i64>,
}

/// Service for managing customers
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Registers a new customer. The email must not already be registered.
    #[instrument(skip(self, new_customer))]
    pub async fn register_customer(&self, new_customer: NewCustomer) -> Result<i64, ServiceError> {
        new_customer.validate()?;

        let db = &*self.db_pool;
        let existing = customer::Entity::find()
            .filter(customer::Column::Email.eq(&new_customer.email))
            .count(db)
            .await?;
        if existing > 0 {
            return Err(ServiceError::ValidationError(format!(
                "email {} is already registered",
                new_customer.email
            )));
        }

        let inserted = customer::ActiveModel {
            first_name: Set(new_customer.first_name),
            middle_name: Set(new_customer.middle_name),
            last_name: Set(new_customer.last_name),
            shipping_address: Set(new_customer.shipping_address),
            billing_address: Set(new_customer.billing_address),
            email: Set(new_customer.email),
            password: Set(new_customer.password),
            phone_number: Set(new_customer.phone_number),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.event_sender
            .send_or_log(Event::CustomerRegistered(inserted.customer_id))
            .await;
        Ok(inserted.customer_id)
    }

    /// Checks a login pair. Passwords are stored and compared as plain
    /// text.
    #[instrument(skip(self, password))]
    pub async fn check_login(&self, email: &str, password: &str) -> Result<bool, ServiceError> {
        let matches = customer::Entity::find()
            .filter(customer::Column::Email.eq(email))
            .filter(customer::Column::Password.eq(password))
            .count(&*self.db_pool)
            .await?;
        Ok(matches > 0)
    }

    /// Gets a customer by id
    #[instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: i64) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Customer".to_string()))
    }
}
