use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::status::ServiceStatus;

/// A laundry service offered by the franchise (wash, dry clean, press...).
#[derive(Debug, Clone)]
pub struct ServiceView {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub duration: String,
    pub status: ServiceStatus,
    pub usage_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub duration: String,
    pub status: ServiceStatus,
}

impl NewService {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() || self.duration.trim().is_empty() {
            return Err(DomainError::missing_fields());
        }
        validate_price(&self.price)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub duration: Option<String>,
    pub status: Option<ServiceStatus>,
}

impl ServiceChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(DomainError::invalid("Name must not be empty"));
        }
        match &self.price {
            Some(price) => validate_price(price),
            None => Ok(()),
        }
    }
}

pub fn validate_price(price: &BigDecimal) -> Result<(), DomainError> {
    if *price < BigDecimal::zero() {
        return Err(DomainError::invalid("Price must not be negative"));
    }
    Ok(())
}
