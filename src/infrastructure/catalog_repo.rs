use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{NewService, ServiceChanges, ServiceView};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::domain::status::ServiceStatus;
use crate::schema::services;

use super::models::{NewServiceRow, ServiceChangesRow, ServiceRow};

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn create(&self, service: NewService) -> Result<ServiceView, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(services::table)
            .values(&NewServiceRow {
                id: Uuid::new_v4(),
                name: service.name.trim().to_string(),
                category: service.category,
                description: service.description,
                price: service.price,
                duration: service.duration,
                status: service.status.as_str().to_string(),
            })
            .returning(ServiceRow::as_returning())
            .get_result::<ServiceRow>(&mut conn)?
            .try_into()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceView>, DomainError> {
        let mut conn = self.pool.get()?;

        services::table
            .find(id)
            .select(ServiceRow::as_select())
            .first::<ServiceRow>(&mut conn)
            .optional()?
            .map(ServiceView::try_from)
            .transpose()
    }

    fn list(&self, active_only: bool) -> Result<Vec<ServiceView>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = services::table.into_boxed();
        if active_only {
            query = query.filter(services::status.eq(ServiceStatus::Active.as_str()));
        }
        query
            .select(ServiceRow::as_select())
            .order(services::name.asc())
            .load::<ServiceRow>(&mut conn)?
            .into_iter()
            .map(ServiceView::try_from)
            .collect()
    }

    fn update(&self, id: Uuid, changes: ServiceChanges) -> Result<ServiceView, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(services::table.find(id))
            .set(&ServiceChangesRow {
                name: changes.name.map(|n| n.trim().to_string()),
                category: changes.category,
                description: changes.description,
                price: changes.price,
                duration: changes.duration,
                status: changes.status.map(|s| s.as_str().to_string()),
                updated_at: Utc::now(),
            })
            .returning(ServiceRow::as_returning())
            .get_result::<ServiceRow>(&mut conn)
            .optional()?
            .ok_or(DomainError::NotFound("Service"))?
            .try_into()
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(services::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
