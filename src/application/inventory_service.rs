use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::inventory::{NewProduct, ProductChanges, ProductView};
use crate::domain::ports::ProductRepository;

pub struct InventoryService {
    repo: Arc<dyn ProductRepository>,
}

impl InventoryService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub fn list_products(&self) -> Result<Vec<ProductView>, DomainError> {
        self.repo.list()
    }

    pub fn low_stock(&self) -> Result<Vec<ProductView>, DomainError> {
        self.repo.low_stock()
    }

    pub fn get_product(&self, id: Uuid) -> Result<ProductView, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Product"))
    }

    pub fn create_product(&self, product: NewProduct) -> Result<ProductView, DomainError> {
        product.validate()?;
        self.repo.create(product)
    }

    pub fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<ProductView, DomainError> {
        changes.validate()?;
        let updated = self.repo.update(id, changes)?;
        if updated.needs_reorder() {
            log::warn!(
                "{} ({}) is at {} units, reorder level {}",
                updated.name,
                updated.sku,
                updated.stock_quantity,
                updated.reorder_level
            );
        }
        Ok(updated)
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete(id)? {
            return Err(DomainError::NotFound("Product"));
        }
        Ok(())
    }
}
