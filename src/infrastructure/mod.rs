pub mod auth_repo;
pub mod catalog_repo;
pub mod customer_repo;
pub mod inventory_repo;
pub mod logistics_repo;
pub mod models;
pub mod order_repo;
pub mod pos_repo;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(unique_violation_message(info.constraint_name()))
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                DomainError::invalid("Referenced record does not exist")
            }
            DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
                DomainError::Conflict("Concurrent update, please retry".to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

fn unique_violation_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("customers_email_key") => "Email exists".to_string(),
        Some("products_sku_key") => "SKU exists".to_string(),
        Some("users_username_key") => "Username exists".to_string(),
        Some(other) => format!("Duplicate value violates {}", other),
        None => "Duplicate value".to_string(),
    }
}
