use std::sync::Arc;

use uuid::Uuid;

use crate::domain::catalog::{NewService, ServiceChanges, ServiceView};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;

pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    /// Services customers can order.
    pub fn active_services(&self) -> Result<Vec<ServiceView>, DomainError> {
        self.repo.list(true)
    }

    pub fn all_services(&self) -> Result<Vec<ServiceView>, DomainError> {
        self.repo.list(false)
    }

    pub fn get_service(&self, id: Uuid) -> Result<ServiceView, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Service"))
    }

    pub fn create_service(&self, service: NewService) -> Result<ServiceView, DomainError> {
        service.validate()?;
        self.repo.create(service)
    }

    pub fn update_service(
        &self,
        id: Uuid,
        changes: ServiceChanges,
    ) -> Result<ServiceView, DomainError> {
        changes.validate()?;
        self.repo.update(id, changes)
    }

    pub fn delete_service(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete(id)? {
            return Err(DomainError::NotFound("Service"));
        }
        Ok(())
    }
}
