use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catalog::validate_price;
use super::errors::DomainError;
use super::presentation::StockLevel;

#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductView {
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.stock_quantity, self.reorder_level)
    }

    pub fn needs_reorder(&self) -> bool {
        self.stock_quantity <= self.reorder_level
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    pub supplier: Option<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [&self.name, &self.sku, &self.category];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(DomainError::missing_fields());
        }
        validate_counts(Some(self.stock_quantity), Some(self.reorder_level))?;
        validate_price(&self.price)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock_quantity: Option<i32>,
    pub reorder_level: Option<i32>,
    pub supplier: Option<String>,
}

impl ProductChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        if matches!(&self.sku, Some(sku) if sku.trim().is_empty()) {
            return Err(DomainError::invalid("sku must not be empty"));
        }
        validate_counts(self.stock_quantity, self.reorder_level)?;
        match &self.price {
            Some(price) => validate_price(price),
            None => Ok(()),
        }
    }
}

fn validate_counts(stock: Option<i32>, reorder: Option<i32>) -> Result<(), DomainError> {
    if stock.is_some_and(|q| q < 0) {
        return Err(DomainError::invalid("stockQuantity must not be negative"));
    }
    if reorder.is_some_and(|r| r < 0) {
        return Err(DomainError::invalid("reorderLevel must not be negative"));
    }
    Ok(())
}
