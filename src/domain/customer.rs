use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<Value>,
    pub total_orders: i32,
    pub total_spent: BigDecimal,
    pub last_order: Option<DateTime<Utc>>,
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<Value>,
    pub password_hash: Option<String>,
}

impl NewCustomer {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(DomainError::missing_fields());
        }
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Value>,
}

impl CustomerChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(DomainError::invalid("Name must not be empty"));
        }
        match &self.email {
            Some(email) => validate_email(email),
            None => Ok(()),
        }
    }
}

/// Stored credentials of a portal customer.
#[derive(Debug, Clone)]
pub struct CustomerCredentials {
    pub customer: CustomerView,
    pub password_hash: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::invalid(format!("Invalid email '{}'", email))),
    }
}
