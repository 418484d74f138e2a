use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::inventory::{NewProduct, ProductChanges, ProductView};
use crate::domain::ports::ProductRepository;
use crate::schema::products;

use super::models::{NewProductRow, ProductChangesRow, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn create(&self, product: NewProduct) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: product.name.trim().to_string(),
                sku: product.sku.trim().to_string(),
                category: product.category,
                description: product.description,
                price: product.price,
                stock_quantity: product.stock_quantity,
                reorder_level: product.reorder_level,
                supplier: product.supplier,
            })
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first::<ProductRow>(&mut conn)
            .optional()?;
        Ok(row.map(ProductView::from))
    }

    fn list(&self) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::name.asc())
            .load::<ProductRow>(&mut conn)?;
        Ok(rows.into_iter().map(ProductView::from).collect())
    }

    fn low_stock(&self) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .filter(products::stock_quantity.le(products::reorder_level))
            .select(ProductRow::as_select())
            .order(products::stock_quantity.asc())
            .load::<ProductRow>(&mut conn)?;
        Ok(rows.into_iter().map(ProductView::from).collect())
    }

    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(products::table.find(id))
            .set(&ProductChangesRow {
                name: changes.name,
                sku: changes.sku.map(|s| s.trim().to_string()),
                category: changes.category,
                description: changes.description,
                price: changes.price,
                stock_quantity: changes.stock_quantity,
                reorder_level: changes.reorder_level,
                supplier: changes.supplier,
                updated_at: Utc::now(),
            })
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .optional()?
            .map(ProductView::from)
            .ok_or(DomainError::NotFound("Product"))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
