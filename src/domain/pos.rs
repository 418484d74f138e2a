use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::status::PaymentMethod;

/// One line of a point-of-sale ticket, stored in `order_transactions.items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct TransactionView {
    pub id: Uuid,
    pub transaction_number: String,
    pub items: Vec<TransactionItem>,
    pub total_amount: BigDecimal,
    pub payment_method: PaymentMethod,
    pub cashier_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub items: Vec<TransactionItem>,
    pub payment_method: PaymentMethod,
    pub cashier_id: Option<String>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::invalid("A transaction needs at least one item"));
        }
        for item in &self.items {
            if item.name.trim().is_empty() {
                return Err(DomainError::missing_fields());
            }
            if item.quantity <= 0 {
                return Err(DomainError::invalid(format!(
                    "Quantity of '{}' must be positive",
                    item.name
                )));
            }
            if item.unit_price < BigDecimal::zero() {
                return Err(DomainError::invalid(format!(
                    "Price of '{}' must not be negative",
                    item.name
                )));
            }
        }
        Ok(())
    }

    pub fn total(&self) -> BigDecimal {
        self.items.iter().fold(BigDecimal::zero(), |acc, item| {
            acc + &item.unit_price * BigDecimal::from(item.quantity)
        })
    }
}

/// `TXN-YYYYMMDD-XXXXXX`, the suffix taken from a fresh id.
pub fn transaction_number(at: DateTime<Utc>, id: &Uuid) -> String {
    let simple = id.simple().to_string();
    format!(
        "TXN-{}-{}",
        at.format("%Y%m%d"),
        simple[..6].to_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;

    use super::*;

    fn item(name: &str, quantity: i32, price: &str) -> TransactionItem {
        TransactionItem {
            name: name.to_string(),
            quantity,
            unit_price: BigDecimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn total_multiplies_quantity_by_price() {
        let txn = NewTransaction {
            items: vec![item("Shirt press", 3, "40.00"), item("Saree dry clean", 1, "350.50")],
            payment_method: PaymentMethod::Cash,
            cashier_id: None,
        };
        assert_eq!(txn.total(), BigDecimal::from_str("470.50").unwrap());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let txn = NewTransaction {
            items: vec![item("Shirt press", 0, "40.00")],
            payment_method: PaymentMethod::Credit,
            cashier_id: None,
        };
        assert!(txn.validate().is_err());
    }

    #[test]
    fn empty_ticket_is_rejected() {
        let txn = NewTransaction {
            items: vec![],
            payment_method: PaymentMethod::Mobile,
            cashier_id: None,
        };
        assert!(txn.validate().is_err());
    }

    #[test]
    fn transaction_number_format() {
        let at = Utc.with_ymd_and_hms(2025, 9, 10, 8, 30, 0).unwrap();
        let id = Uuid::parse_str("abcdef12-0000-4000-8000-000000000000").unwrap();
        assert_eq!(transaction_number(at, &id), "TXN-20250910-ABCDEF");
    }
}
